use domain::{BalanceSnapshot, Condition, SubWallet};

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub subject: String,
    /// Balance reported in the notification.
    pub balance: f64,
}

/// Fires when the condition holds for `current`. `baseline` is the entry's
/// stored snapshot; `total_threshold` is the fixed bound of the total conditions.
pub fn evaluate(
    condition: Condition,
    current: &BalanceSnapshot,
    baseline: &BalanceSnapshot,
    threshold: Option<f64>,
    total_threshold: f64,
) -> Option<Trigger> {
    let total = current.total_usd_value;
    match condition {
        Condition::TotalAbove if total > total_threshold => Some(Trigger {
            subject: format!("Total Balance Exceeded ${total_threshold}"),
            balance: total,
        }),
        Condition::TotalBelow if total < total_threshold => Some(Trigger {
            subject: format!("Total Balance Dropped Below ${total_threshold}"),
            balance: total,
        }),
        Condition::SubWalletIncrease(wallet) => {
            let now = current.sub_wallet_usd(wallet);
            (now > baseline.sub_wallet_usd(wallet)).then(|| Trigger {
                subject: increase_subject(wallet),
                balance: now,
            })
        }
        Condition::Custom => match threshold {
            Some(limit) if total > limit => Some(Trigger {
                subject: format!("Total Balance Exceeded Custom Threshold ${limit}"),
                balance: total,
            }),
            _ => None,
        },
        Condition::TotalAbove | Condition::TotalBelow => None,
    }
}

fn increase_subject(wallet: SubWallet) -> String {
    format!("{} Balance Increased", wallet.display_name())
}

pub fn compose_body(condition: Condition, balance: f64, threshold: Option<f64>) -> String {
    let mut body = format!(
        "Your reminder for condition '{condition}' has been triggered.\nCurrent balance: ${balance:.2}"
    );
    if let Some(threshold) = threshold {
        body.push_str(&format!("\nThreshold: ${threshold:.2}"));
    }
    body
}

#[cfg(test)]
mod tests {
    use domain::{CoinbaseBalance, HydraBalance};

    use super::*;

    fn snapshot(total: f64, hydra: f64, coinbase: f64) -> BalanceSnapshot {
        BalanceSnapshot {
            total_usd_value: total,
            hydra: HydraBalance {
                balance_hbar: hydra / 0.05,
                usd_value: hydra,
            },
            coinbase: CoinbaseBalance {
                balance_usd: coinbase,
            },
        }
    }

    #[test]
    fn total_bounds_against_fixed_threshold() {
        let base = BalanceSnapshot::default();
        let high = snapshot(52.3, 50.0, 2.3);
        let low = snapshot(49.9, 47.5, 2.4);

        let fired = evaluate(Condition::TotalAbove, &high, &base, None, 51.0).expect("above");
        assert_eq!(fired.balance, 52.3);
        assert_eq!(fired.subject, "Total Balance Exceeded $51");
        assert!(evaluate(Condition::TotalAbove, &low, &base, None, 51.0).is_none());

        let fired = evaluate(Condition::TotalBelow, &low, &base, None, 51.0).expect("below");
        assert_eq!(fired.balance, 49.9);
        assert!(evaluate(Condition::TotalBelow, &high, &base, None, 51.0).is_none());

        let exact = snapshot(51.0, 49.0, 2.0);
        assert!(evaluate(Condition::TotalAbove, &exact, &base, None, 51.0).is_none());
        assert!(evaluate(Condition::TotalBelow, &exact, &base, None, 51.0).is_none());
    }

    #[test]
    fn sub_wallet_increase_is_strict() {
        let hydra = Condition::SubWalletIncrease(SubWallet::Hydra);
        let coinbase = Condition::SubWalletIncrease(SubWallet::Coinbase);
        let s0 = snapshot(52.5, 50.0, 2.5);

        let up = snapshot(52.6, 50.1, 2.5);
        let fired = evaluate(hydra, &up, &s0, None, 51.0).expect("hydra up");
        assert_eq!(fired.subject, "Hydra Balance Increased");
        assert_eq!(fired.balance, 50.1);
        assert!(evaluate(coinbase, &up, &s0, None, 51.0).is_none());

        let down = snapshot(52.0, 49.9, 2.1);
        assert!(evaluate(hydra, &down, &s0, None, 51.0).is_none());
        assert!(evaluate(hydra, &s0, &s0, None, 51.0).is_none());

        let coin_up = snapshot(52.6, 50.0, 2.6);
        let fired = evaluate(coinbase, &coin_up, &s0, None, 51.0).expect("coinbase up");
        assert_eq!(fired.subject, "Coinbase Balance Increased");
    }

    #[test]
    fn custom_requires_threshold() {
        let base = BalanceSnapshot::default();
        let at_95 = snapshot(95.0, 90.0, 5.0);
        let at_101 = snapshot(101.0, 96.0, 5.0);

        assert!(evaluate(Condition::Custom, &at_95, &base, Some(100.0), 51.0).is_none());
        let fired = evaluate(Condition::Custom, &at_101, &base, Some(100.0), 51.0).expect("custom");
        assert_eq!(fired.balance, 101.0);
        assert_eq!(fired.subject, "Total Balance Exceeded Custom Threshold $100");
        assert!(evaluate(Condition::Custom, &at_101, &base, None, 51.0).is_none());
    }

    #[test]
    fn body_mentions_condition_balance_and_threshold() {
        let body = compose_body(Condition::Custom, 101.0, Some(100.0));
        assert_eq!(
            body,
            "Your reminder for condition 'custom' has been triggered.\nCurrent balance: $101.00\nThreshold: $100.00"
        );
        let body = compose_body(Condition::TotalBelow, 49.876, None);
        assert!(body.ends_with("Current balance: $49.88"));
    }
}
