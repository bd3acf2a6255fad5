#[cfg(test)]
mod tests {
    use crate::market_data::{OutlierFilter, PriceRefreshService, PriceRepositoryTrait};
    use crate::test_support::{date, InMemoryFund, StubPriceProvider};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_refresh_stores_rows_inside_window_only() {
        let provider = Arc::new(StubPriceProvider::new().with_daily_bars(
            "SPY",
            date(2024, 1, 6),
            &[dec!(470), dec!(471), dec!(472), dec!(473), dec!(474)],
        ));
        let fund = Arc::new(InMemoryFund::new());
        let service = PriceRefreshService::new(provider.clone(), fund.clone());

        let report = service
            .refresh(&tickers(&["SPY"]), date(2024, 1, 7), date(2024, 1, 9))
            .await;

        assert_eq!(report.tickers_requested, 1);
        assert_eq!(report.rows_fetched, 3);
        assert_eq!(report.rows_inserted, 3);
        assert!(report.failures.is_empty());
        let stored = fund.get_price_history("SPY", date(2024, 12, 31)).unwrap();
        assert_eq!(stored.first().unwrap().date, date(2024, 1, 7));
        assert_eq!(stored.last().unwrap().date, date(2024, 1, 9));
        assert_eq!(
            provider.calls.lock().unwrap().clone(),
            vec![("SPY".to_string(), date(2024, 1, 7), date(2024, 1, 9))]
        );
    }

    #[tokio::test]
    async fn test_refresh_skips_failing_tickers() {
        let provider = Arc::new(
            StubPriceProvider::new()
                .with_daily_bars("SPY", date(2024, 1, 1), &[dec!(470), dec!(471)])
                .with_failure("QQQ", "rate limited"),
        );
        let fund = Arc::new(InMemoryFund::new());
        let service = PriceRefreshService::new(provider, fund.clone());

        let report = service
            .refresh(
                &tickers(&["QQQ", "MISSING", "SPY"]),
                date(2024, 1, 1),
                date(2024, 1, 7),
            )
            .await;

        assert_eq!(report.rows_inserted, 2);
        let failed: Vec<&str> = report.failures.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(failed, vec!["QQQ", "MISSING"]);
        assert_eq!(fund.price_count(), 2);
    }

    #[tokio::test]
    async fn test_refetching_a_week_does_not_duplicate_rows() {
        let provider = Arc::new(StubPriceProvider::new().with_daily_bars(
            "SPY",
            date(2024, 1, 1),
            &[dec!(470), dec!(471), dec!(472)],
        ));
        let fund = Arc::new(InMemoryFund::new());
        let service = PriceRefreshService::new(provider, fund.clone());
        let universe = tickers(&["SPY"]);

        service.refresh(&universe, date(2024, 1, 1), date(2024, 1, 7)).await;
        let again = service.refresh(&universe, date(2024, 1, 1), date(2024, 1, 7)).await;

        assert_eq!(again.rows_fetched, 3);
        assert_eq!(again.rows_inserted, 0);
        assert_eq!(fund.price_count(), 3);
    }

    #[tokio::test]
    async fn test_refresh_drops_non_positive_prices_and_outliers() {
        let mut closes = vec![dec!(100); 12];
        closes[3] = dec!(0);
        closes[7] = dec!(10000);
        let provider =
            Arc::new(StubPriceProvider::new().with_daily_bars("SPY", date(2024, 1, 1), &closes));
        let fund = Arc::new(InMemoryFund::new());
        let service = PriceRefreshService::new(provider, fund.clone())
            .with_outlier_filter(OutlierFilter::iqr(1.5));

        let report = service
            .refresh(&tickers(&["SPY"]), date(2024, 1, 1), date(2024, 1, 31))
            .await;

        assert_eq!(report.rows_inserted, 10);
        let stored = fund.get_price_history("SPY", date(2024, 1, 31)).unwrap();
        assert!(stored.iter().all(|p| p.price == dec!(100)));
    }
}
