#[cfg(test)]
mod tests {
    use crate::portfolio::holdings::{bucket_value, split_cash, Position, RiskBucket};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    }

    fn position(ticker: &str, quantity: Decimal, price: Decimal) -> Position {
        Position {
            risk_bucket: RiskBucket::HyEquity,
            ticker: ticker.to_string(),
            quantity,
            manager_id: "M1".to_string(),
            last_updated: day(),
            spot_price: price,
        }
    }

    #[test]
    fn test_risk_bucket_round_trips_through_strings() {
        for bucket in RiskBucket::ALL {
            assert_eq!(RiskBucket::from_str(bucket.as_str()).unwrap(), bucket);
        }
        assert_eq!(RiskBucket::from_str("hy_equity").unwrap(), RiskBucket::HyEquity);
        assert!(RiskBucket::from_str("MEDIUM").is_err());
    }

    #[test]
    fn test_risk_bucket_displays_persisted_name() {
        assert_eq!(RiskBucket::LowTurnover.to_string(), "LOW_TURNOVER");
    }

    #[test]
    fn test_cash_position_has_unit_price() {
        let cash = Position::cash(RiskBucket::LowRisk, "M1", dec!(10000), day());
        assert!(cash.is_cash());
        assert_eq!(cash.spot_price, dec!(1));
        assert_eq!(cash.market_value(), dec!(10000));
    }

    #[test]
    fn test_validate_rejects_negative_values() {
        assert!(position("AAPL", dec!(-1), dec!(10)).validate().is_err());
        assert!(position("AAPL", dec!(1), dec!(-10)).validate().is_err());
        assert!(position(" ", dec!(1), dec!(10)).validate().is_err());
        assert!(position("AAPL", dec!(0), dec!(0)).validate().is_ok());
    }

    #[test]
    fn test_split_cash_and_bucket_value() {
        let positions = vec![
            position("AAPL", dec!(50), dec!(110)),
            Position::cash(RiskBucket::HyEquity, "M1", dec!(9450), day()),
            position("MSFT", dec!(2), dec!(300)),
        ];
        assert_eq!(bucket_value(&positions), dec!(15550));

        let (cash, invested) = split_cash(positions);
        assert_eq!(cash.unwrap().quantity, dec!(9450));
        assert_eq!(invested.len(), 2);
        assert!(invested.iter().all(|p| !p.is_cash()));
    }
}
