#[cfg(test)]
mod tests {
    use crate::deals::TradeSide;
    use crate::errors::{Error, StrategyError};
    use crate::portfolio::holdings::RiskBucket;
    use crate::strategies::volatility_target::{
        CandidateRejection, OptimizerInput, VolatilityTargetOptimizer,
    };
    use crate::strategies::{
        OptimizerSettings, PositionWrites, RebalanceStrategy, StrategyStatus,
        VolatilityTargetStrategy,
    };
    use crate::test_support::{date, InMemoryFund};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    const BUCKET: RiskBucket = RiskBucket::LowRisk;

    fn seeded(seed: u64) -> OptimizerSettings {
        OptimizerSettings {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Prices starting at `start`, cycling through the daily growth factors.
    fn drifting(start: Decimal, factors: &[Decimal], days: usize) -> Vec<Decimal> {
        let mut price = start;
        let mut prices = Vec::with_capacity(days);
        for i in 0..days {
            prices.push(price);
            price = (price * factors[i % factors.len()]).round_dp(4);
        }
        prices
    }

    fn a_prices() -> Vec<Decimal> {
        drifting(dec!(10), &[dec!(1.002), dec!(1.000)], 30)
    }

    fn b_prices() -> Vec<Decimal> {
        drifting(dec!(20), &[dec!(1.000), dec!(1.003), dec!(1.001)], 30)
    }

    fn input(held: Vec<Decimal>, prices: Vec<Decimal>, cash: Decimal, var: f64) -> OptimizerInput {
        let n = prices.len();
        OptimizerInput {
            tickers: (0..n).map(|i| format!("T{}", i)).collect(),
            held,
            prices,
            cash,
            mean_returns: vec![0.001; n],
            covariance: (0..n)
                .map(|i| (0..n).map(|j| if i == j { var } else { 0.0 }).collect())
                .collect(),
        }
    }

    fn drifting_fund(cash: Decimal, held_a: Decimal, held_b: Decimal) -> InMemoryFund {
        InMemoryFund::new()
            .with_manager(BUCKET, "M1")
            .with_cash(BUCKET, "M1", cash)
            .with_position(BUCKET, "M1", "AAA", held_a, dec!(10))
            .with_position(BUCKET, "M1", "BBB", held_b, dec!(20))
            .with_daily_prices("AAA", date(2024, 1, 1), &a_prices())
            .with_daily_prices("BBB", date(2024, 1, 1), &b_prices())
    }

    fn strategy(fund: &Arc<InMemoryFund>, settings: OptimizerSettings) -> VolatilityTargetStrategy {
        VolatilityTargetStrategy::new(settings, fund.clone(), fund.clone(), fund.clone())
    }

    #[test]
    fn test_input_requires_three_observations() {
        let result = OptimizerInput::from_histories(
            vec!["AAA".to_string()],
            vec![dec!(1)],
            dec!(100),
            &[vec![dec!(10), dec!(11)]],
        );
        assert!(matches!(
            result,
            Err(Error::Strategy(StrategyError::DataUnavailable { available: 2, .. }))
        ));
    }

    #[test]
    fn test_input_estimates_moments_from_log_returns() {
        let input = OptimizerInput::from_histories(
            vec!["AAA".to_string(), "BBB".to_string()],
            vec![dec!(1), dec!(2)],
            dec!(100),
            &[a_prices(), b_prices()],
        )
        .unwrap();
        assert_eq!(input.prices, vec![a_prices()[29], b_prices()[29]]);
        assert!(input.mean_returns.iter().all(|m| *m > 0.0));
        assert_eq!(input.covariance.len(), 2);
        assert!(input.covariance[0][0] > 0.0);
        assert!((input.covariance[0][1] - input.covariance[1][0]).abs() < 1e-15);
    }

    #[test]
    fn test_weights_outside_delta_bounds_are_rejected() {
        let settings = OptimizerSettings::default();
        let input = input(vec![dec!(0), dec!(0)], vec![dec!(1), dec!(1)], dec!(1000000), 1e-6);
        let optimizer = VolatilityTargetOptimizer::new(&settings, &input);
        assert_eq!(
            optimizer.evaluate_weights(&[0.5, 0.5]),
            Err(CandidateRejection::DeltaOutOfBounds)
        );
    }

    #[test]
    fn test_large_sells_are_rejected_by_lower_bound() {
        let settings = OptimizerSettings::default();
        let input = input(vec![dec!(20000), dec!(0)], vec![dec!(1), dec!(1)], dec!(0), 1e-6);
        let optimizer = VolatilityTargetOptimizer::new(&settings, &input);
        assert_eq!(
            optimizer.evaluate_weights(&[0.0, 1.0]),
            Err(CandidateRejection::DeltaOutOfBounds)
        );
    }

    #[test]
    fn test_volatile_weights_are_rejected() {
        let settings = OptimizerSettings::default();
        let input = input(vec![dec!(0), dec!(0)], vec![dec!(10), dec!(10)], dec!(1000), 0.01);
        let optimizer = VolatilityTargetOptimizer::new(&settings, &input);
        assert!(optimizer.horizon_volatility(&[0.5, 0.5]) > settings.target_volatility);
        assert_eq!(
            optimizer.evaluate_weights(&[0.5, 0.5]),
            Err(CandidateRejection::VolatilityAboveTarget)
        );
    }

    #[test]
    fn test_accepted_weights_become_whole_quantities() {
        let settings = OptimizerSettings::default();
        let input = input(vec![dec!(10), dec!(0)], vec![dec!(10), dec!(30)], dec!(900), 1e-6);
        let optimizer = VolatilityTargetOptimizer::new(&settings, &input);

        let (quantities, net_cost) = optimizer.evaluate_weights(&[0.25, 0.75]).unwrap();
        assert_eq!(quantities, vec![dec!(25), dec!(25)]);
        assert_eq!(net_cost, dec!(900));
    }

    #[test]
    fn test_highest_gain_is_excluded_when_out_of_bounds() {
        let settings = OptimizerSettings {
            max_delta: 600,
            ..seeded(11)
        };
        let mut input = input(vec![dec!(0), dec!(0)], vec![dec!(1), dec!(1)], dec!(1000), 1e-8);
        input.mean_returns = vec![0.01, 0.0001];
        let optimizer = VolatilityTargetOptimizer::new(&settings, &input);
        let mut rng = StdRng::seed_from_u64(11);

        // All-in on the fast grower would gain the most, but buys 1000 units.
        assert_eq!(
            optimizer.evaluate_weights(&[1.0, 0.0]),
            Err(CandidateRejection::DeltaOutOfBounds)
        );
        let all_in_gain = optimizer.expected_gain(&[1000.0, 0.0], &mut rng);

        let report = optimizer.search(&mut rng);

        assert!(report.rejected.get("DeltaOutOfBounds").copied().unwrap_or(0) > 0);
        assert!(report.evaluated > 0);
        let winner = report.winner.expect("an in-bounds allocation beats holding cash");
        assert!(winner.quantities.iter().all(|q| *q <= dec!(600)));
        assert!(winner.quantities[0] > dec!(500));
        assert!(winner.expected_gain < all_in_gain);
    }

    #[test]
    fn test_winner_never_costs_more_than_cash() {
        let input = OptimizerInput::from_histories(
            vec!["AAA".to_string(), "BBB".to_string()],
            vec![dec!(300), dec!(40)],
            dec!(500),
            &[a_prices(), b_prices()],
        )
        .unwrap();

        for seed in [1_u64, 2, 3, 5, 8, 13] {
            let settings = seeded(seed);
            let optimizer = VolatilityTargetOptimizer::new(&settings, &input);
            let report = optimizer.search(&mut StdRng::seed_from_u64(seed));
            if let Some(winner) = report.winner {
                assert!(winner.net_cost <= input.cash, "seed {}", seed);
                assert!(winner.expected_gain > report.baseline_gain);
            }
        }
    }

    #[test]
    fn test_optimizer_invests_cash_in_drifting_assets() {
        let fund = Arc::new(drifting_fund(dec!(10000), dec!(0), dec!(0)));

        let outcome = strategy(&fund, seeded(42)).plan(date(2024, 2, 5)).unwrap();

        assert_eq!(outcome.status, StrategyStatus::Rebalanced);
        let plan = outcome.plan.unwrap();
        let PositionWrites::ReplaceAll(positions) = &plan.position_writes else {
            panic!("optimizer replaces the bucket");
        };
        assert_eq!(positions.len(), 3);
        let cash = positions.iter().find(|p| p.is_cash()).unwrap();
        assert!(cash.quantity >= Decimal::ZERO);
        assert!(cash.quantity < dec!(10000));
        assert!(!plan.deals.is_empty());
        for deal in &plan.deals {
            assert_eq!(deal.side, TradeSide::Buy);
            let position = positions.iter().find(|p| p.ticker == deal.ticker).unwrap();
            assert_eq!(position.quantity, deal.quantity);
            assert_eq!(position.last_updated, date(2024, 2, 5));
        }
        let spent: Decimal = plan.deals.iter().map(|d| d.quantity * d.price).sum();
        assert_eq!(cash.quantity, dec!(10000) - spent);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let fund = Arc::new(drifting_fund(dec!(5000), dec!(100), dec!(50)));
        let first = strategy(&fund, seeded(7)).plan(date(2024, 2, 5)).unwrap();
        let second = strategy(&fund, seeded(7)).plan(date(2024, 2, 5)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bucket_without_tickers_is_rejected() {
        let fund = Arc::new(
            InMemoryFund::new()
                .with_manager(BUCKET, "M1")
                .with_cash(BUCKET, "M1", dec!(1000)),
        );
        let outcome = strategy(&fund, seeded(1)).plan(date(2024, 2, 5)).unwrap();
        assert!(outcome.status.is_rejected());
    }

    #[test]
    fn test_missing_history_rejects_bucket() {
        let fund = Arc::new(
            InMemoryFund::new()
                .with_manager(BUCKET, "M1")
                .with_cash(BUCKET, "M1", dec!(1000))
                .with_position(BUCKET, "M1", "AAA", dec!(1), dec!(10))
                .with_position(BUCKET, "M1", "NODATA", dec!(1), dec!(10))
                .with_daily_prices("AAA", date(2024, 1, 1), &a_prices()),
        );
        let outcome = strategy(&fund, seeded(1)).plan(date(2024, 2, 5)).unwrap();
        assert!(outcome.status.is_rejected());
        assert!(outcome.plan.is_none());
    }
}
