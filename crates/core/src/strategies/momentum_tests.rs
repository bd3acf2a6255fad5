#[cfg(test)]
mod tests {
    use crate::deals::TradeSide;
    use crate::portfolio::holdings::RiskBucket;
    use crate::strategies::momentum::{allocate, MomentumSignal};
    use crate::strategies::{
        MomentumSettings, MomentumStrategy, PositionWrites, RebalanceStrategy, StrategyStatus,
    };
    use crate::test_support::{date, InMemoryFund};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    const BUCKET: RiskBucket = RiskBucket::HyEquity;

    fn strategy(fund: &Arc<InMemoryFund>) -> MomentumStrategy {
        MomentumStrategy::new(
            MomentumSettings::default(),
            fund.clone(),
            fund.clone(),
            fund.clone(),
        )
    }

    fn week(first: Decimal, last: Decimal) -> Vec<Decimal> {
        let mut prices = vec![first; 7];
        prices.push(last);
        prices
    }

    fn signal(ticker: &str, held: Decimal, price: Decimal, ret: Decimal) -> MomentumSignal {
        MomentumSignal {
            ticker: ticker.to_string(),
            held,
            latest_price: price,
            weekly_return: ret,
        }
    }

    #[test]
    fn test_desired_delta_rounds_half_to_even() {
        assert_eq!(signal("A", dec!(25), dec!(1), dec!(0.1)).desired_delta(), dec!(2));
        assert_eq!(signal("A", dec!(35), dec!(1), dec!(0.1)).desired_delta(), dec!(4));
        assert_eq!(signal("A", dec!(10), dec!(1), dec!(-0.25)).desired_delta(), dec!(-2));
    }

    #[test]
    fn test_allocate_clips_buy_to_cash() {
        let (trades, cash) =
            allocate(dec!(200), vec![signal("A", dec!(100), dec!(110), dec!(0.1))]);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity, dec!(1));
        assert_eq!(trades[0].new_quantity, dec!(101));
        assert_eq!(cash, dec!(90));
    }

    #[test]
    fn test_allocate_skips_unaffordable_buy() {
        let (trades, cash) = allocate(dec!(50), vec![signal("A", dec!(100), dec!(110), dec!(0.1))]);
        assert!(trades.is_empty());
        assert_eq!(cash, dec!(50));
    }

    #[test]
    fn test_allocate_ranks_by_absolute_return_and_sells_fund_buys() {
        let signals = vec![
            signal("SMALL", dec!(100), dec!(10), dec!(0.05)),
            signal("DROP", dec!(100), dec!(20), dec!(-0.5)),
        ];
        let (trades, cash) = allocate(Decimal::ZERO, signals);

        assert_eq!(trades[0].ticker, "DROP");
        assert_eq!(trades[0].side, TradeSide::Sell);
        assert_eq!(trades[0].quantity, dec!(50));
        assert_eq!(trades[1].ticker, "SMALL");
        assert_eq!(trades[1].side, TradeSide::Buy);
        assert_eq!(trades[1].quantity, dec!(5));
        assert_eq!(cash, dec!(950));
    }

    #[test]
    fn test_allocate_breaks_ties_by_ticker() {
        let signals = vec![
            signal("B", dec!(10), dec!(10), dec!(0.1)),
            signal("A", dec!(10), dec!(10), dec!(-0.1)),
        ];
        let (trades, _) = allocate(dec!(1000), signals);
        let order: Vec<&str> = trades.iter().map(|t| t.ticker.as_str()).collect();
        assert_eq!(order, vec!["A", "B"]);
    }

    #[test]
    fn test_allocate_clamps_sell_to_held() {
        let (trades, cash) = allocate(dec!(0), vec![signal("A", dec!(3), dec!(10), dec!(-2))]);
        assert_eq!(trades[0].quantity, dec!(3));
        assert_eq!(trades[0].new_quantity, Decimal::ZERO);
        assert_eq!(cash, dec!(30));
    }

    #[test]
    fn test_momentum_buys_after_weekly_gain() {
        let fund = Arc::new(
            InMemoryFund::new()
                .with_manager(BUCKET, "M3")
                .with_cash(BUCKET, "M3", dec!(10000))
                .with_position(BUCKET, "M3", "AAPL", dec!(50), dec!(100))
                .with_daily_prices("AAPL", date(2024, 1, 1), &week(dec!(100), dec!(110))),
        );

        let outcome = strategy(&fund).plan(date(2024, 1, 8)).unwrap();

        assert_eq!(outcome.status, StrategyStatus::Rebalanced);
        let plan = outcome.plan.unwrap();
        assert_eq!(plan.deals.len(), 1);
        let deal = &plan.deals[0];
        assert_eq!(deal.side, TradeSide::Buy);
        assert_eq!(deal.quantity, dec!(5));
        assert_eq!(deal.price, dec!(110));
        assert_eq!(deal.execution_date, date(2024, 1, 8));

        let PositionWrites::Upsert(positions) = plan.position_writes else {
            panic!("momentum upserts positions");
        };
        let aapl = positions.iter().find(|p| p.ticker == "AAPL").unwrap();
        assert_eq!(aapl.quantity, dec!(55));
        assert_eq!(aapl.spot_price, dec!(110));
        let cash = positions.iter().find(|p| p.is_cash()).unwrap();
        assert_eq!(cash.quantity, dec!(9450));
    }

    #[test]
    fn test_momentum_skips_short_history() {
        let fund = Arc::new(
            InMemoryFund::new()
                .with_manager(BUCKET, "M3")
                .with_cash(BUCKET, "M3", dec!(10000))
                .with_position(BUCKET, "M3", "AAPL", dec!(50), dec!(100))
                .with_daily_prices("AAPL", date(2024, 1, 2), &[dec!(100), dec!(150)]),
        );

        let outcome = strategy(&fund).plan(date(2024, 1, 8)).unwrap();
        assert_eq!(outcome.status, StrategyStatus::Unchanged);
        assert!(outcome.plan.is_none());
    }

    #[test]
    fn test_momentum_ignores_prices_after_simulation_date() {
        let mut prices = week(dec!(100), dec!(100));
        prices.push(dec!(200));
        let fund = Arc::new(
            InMemoryFund::new()
                .with_manager(BUCKET, "M3")
                .with_cash(BUCKET, "M3", dec!(10000))
                .with_position(BUCKET, "M3", "AAPL", dec!(50), dec!(100))
                .with_daily_prices("AAPL", date(2024, 1, 1), &prices),
        );

        let outcome = strategy(&fund).plan(date(2024, 1, 8)).unwrap();
        assert_eq!(outcome.status, StrategyStatus::Unchanged);
    }

    #[test]
    fn test_momentum_rejects_bucket_without_cash() {
        let fund = Arc::new(
            InMemoryFund::new()
                .with_manager(BUCKET, "M3")
                .with_position(BUCKET, "M3", "AAPL", dec!(50), dec!(100)),
        );

        let outcome = strategy(&fund).plan(date(2024, 1, 8)).unwrap();
        assert!(outcome.status.is_rejected());
        assert!(outcome.plan.is_none());
    }

    #[test]
    fn test_momentum_rejects_bucket_without_manager() {
        let fund = Arc::new(InMemoryFund::new().with_cash(BUCKET, "M3", dec!(100)));
        let outcome = strategy(&fund).plan(date(2024, 1, 8)).unwrap();
        assert!(outcome.status.is_rejected());
    }
}
