// Test cases for the FIFO change applier.
#[cfg(test)]
mod tests {
    use crate::changes::changes_model::Change;
    use crate::changes::changes_service::ChangeApplier;
    use crate::changes::ChangeError;
    use crate::errors::Error;
    use crate::instruments::{Instrument, InstrumentStatus};
    use crate::ledger::{LedgerSession, Lot};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn empty_session() -> LedgerSession {
        LedgerSession::from_parts(Vec::new(), HashMap::new(), (1..=5).collect())
    }

    fn buy(ticker: &str, d: u32, qty: Decimal, price: Decimal) -> Change {
        Change {
            change_date: day(d),
            name: format!("{} Corp", ticker),
            ticker: ticker.to_string(),
            unit_price: price,
            quantity: qty,
        }
    }

    fn sell(ticker: &str, d: u32, qty: Decimal, price: Decimal) -> Change {
        Change {
            change_date: day(d),
            name: format!("{} Corp", ticker),
            ticker: ticker.to_string(),
            unit_price: price,
            quantity: -qty,
        }
    }

    fn liquidate(ticker: &str, d: u32, price: Decimal) -> Change {
        Change {
            change_date: day(d),
            name: format!("{} Corp", ticker),
            ticker: ticker.to_string(),
            unit_price: price,
            quantity: Decimal::ZERO,
        }
    }

    fn active(session: &LedgerSession, ticker: &str) -> Instrument {
        session
            .find_active_by_ticker(ticker)
            .expect("active instrument")
            .clone()
    }

    #[test]
    fn buy_of_unseen_ticker_creates_active_instrument_with_one_lot() {
        let mut session = empty_session();
        let applier = ChangeApplier::new();

        let audits = applier
            .apply_batch(&mut session, &[buy("ACME", 1, dec!(10), dec!(100))])
            .unwrap();

        let instrument = active(&session, "ACME");
        assert_eq!(instrument.status, InstrumentStatus::Active);
        assert_eq!(instrument.total_shares, dec!(10));
        assert_eq!(instrument.last_price, dec!(100));
        assert_eq!(instrument.color_id, 1);

        let lots = session.lots_for(instrument.id);
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].quantity, dec!(10));
        assert_eq!(lots[0].unit_price, dec!(100));

        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].instrument_id, instrument.id);
        assert_eq!(audits[0].quantity, dec!(10));
    }

    #[test]
    fn same_day_buys_stay_in_separate_lots() {
        let mut session = empty_session();
        let applier = ChangeApplier::new();

        applier
            .apply_batch(
                &mut session,
                &[
                    buy("ACME", 1, dec!(10), dec!(100)),
                    buy("ACME", 1, dec!(5), dec!(105)),
                ],
            )
            .unwrap();

        let instrument = active(&session, "ACME");
        let lots = session.lots_for(instrument.id);
        assert_eq!(lots.len(), 2);
        assert_eq!(lots[0].unit_price, dec!(100));
        assert_eq!(lots[1].unit_price, dec!(105));
        assert_eq!(instrument.total_shares, dec!(15));
    }

    #[test]
    fn fifo_sell_consumes_oldest_lots_first() {
        // Worked example: 10 @ 100 on day 1, 5 @ 120 on day 3, sell 12 on
        // day 5 leaves one lot {3 @ 120, day 3}.
        let mut session = empty_session();
        let applier = ChangeApplier::new();

        applier
            .apply_batch(
                &mut session,
                &[
                    buy("ACME", 1, dec!(10), dec!(100)),
                    buy("ACME", 3, dec!(5), dec!(120)),
                    sell("ACME", 5, dec!(12), dec!(130)),
                ],
            )
            .unwrap();

        let instrument = active(&session, "ACME");
        assert_eq!(instrument.total_shares, dec!(3));

        let lots = session.lots_for(instrument.id);
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].quantity, dec!(3));
        assert_eq!(lots[0].unit_price, dec!(120));
        assert_eq!(lots[0].acquired_date, day(3));
    }

    #[test]
    fn conservation_after_every_step() {
        let mut session = empty_session();
        let applier = ChangeApplier::new();

        let batch = [
            buy("ACME", 1, dec!(10), dec!(100)),
            buy("BOLT", 1, dec!(4), dec!(50)),
            buy("ACME", 2, dec!(6), dec!(110)),
            sell("ACME", 3, dec!(8), dec!(115)),
        ];

        for change in &batch {
            applier.apply_batch(&mut session, &[change.clone()]).unwrap();
            for instrument in session.instruments() {
                if instrument.is_active() {
                    assert_eq!(
                        instrument.total_shares,
                        session.shares_held(instrument.id),
                        "share count drifted from open lots for {}",
                        instrument.ticker
                    );
                }
            }
        }
    }

    #[test]
    fn sell_of_entire_position_disables_instrument() {
        let mut session = empty_session();
        let applier = ChangeApplier::new();

        applier
            .apply_batch(
                &mut session,
                &[
                    buy("ACME", 1, dec!(10), dec!(100)),
                    sell("ACME", 2, dec!(10), dec!(90)),
                ],
            )
            .unwrap();

        assert!(session.find_active_by_ticker("ACME").is_none());
        let instrument = &session.instruments()[0];
        assert_eq!(instrument.status, InstrumentStatus::Disabled);
        assert_eq!(instrument.total_shares, Decimal::ZERO);
        assert!(session.lots_for(instrument.id).is_empty());
    }

    #[test]
    fn liquidation_removes_all_lots_unconditionally() {
        let mut session = empty_session();
        let applier = ChangeApplier::new();

        applier
            .apply_batch(
                &mut session,
                &[
                    buy("ACME", 1, dec!(10), dec!(100)),
                    buy("ACME", 2, dec!(7), dec!(120)),
                    liquidate("ACME", 3, dec!(110)),
                ],
            )
            .unwrap();

        assert!(session.find_active_by_ticker("ACME").is_none());
        let instrument = &session.instruments()[0];
        assert_eq!(instrument.status, InstrumentStatus::Disabled);
        assert!(session.lots_for(instrument.id).is_empty());
    }

    #[test]
    fn oversell_fails_with_insufficient_shares_and_leaves_lots_unchanged() {
        let mut session = empty_session();
        let applier = ChangeApplier::new();

        applier
            .apply_batch(
                &mut session,
                &[
                    buy("ACME", 1, dec!(10), dec!(100)),
                    buy("ACME", 3, dec!(2), dec!(120)),
                ],
            )
            .unwrap();

        let err = applier
            .apply_batch(&mut session, &[sell("ACME", 5, dec!(20), dec!(90))])
            .unwrap_err();

        match err {
            Error::Change(ChangeError::InsufficientShares {
                requested, held, ..
            }) => {
                assert_eq!(requested, dec!(20));
                assert_eq!(held, dec!(12));
            }
            other => panic!("expected InsufficientShares, got {:?}", other),
        }

        let instrument = active(&session, "ACME");
        assert_eq!(instrument.total_shares, dec!(12));
        assert_eq!(session.lots_for(instrument.id).len(), 2);
    }

    #[test]
    fn sell_of_untracked_ticker_fails_with_instrument_not_found() {
        let mut session = empty_session();
        let applier = ChangeApplier::new();

        let err = applier
            .apply_batch(&mut session, &[sell("GHOST", 1, dec!(1), dec!(10))])
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Change(ChangeError::InstrumentNotFound(ticker)) if ticker == "GHOST"
        ));
    }

    #[test]
    fn buy_enables_sell_later_in_the_same_batch() {
        let mut session = empty_session();
        let applier = ChangeApplier::new();

        applier
            .apply_batch(
                &mut session,
                &[
                    buy("ACME", 1, dec!(10), dec!(100)),
                    sell("ACME", 1, dec!(4), dec!(101)),
                ],
            )
            .unwrap();

        let instrument = active(&session, "ACME");
        assert_eq!(instrument.total_shares, dec!(6));
    }

    #[test]
    fn reopened_ticker_gets_a_fresh_id() {
        let mut session = empty_session();
        let applier = ChangeApplier::new();

        applier
            .apply_batch(
                &mut session,
                &[
                    buy("ACME", 1, dec!(10), dec!(100)),
                    liquidate("ACME", 2, dec!(100)),
                    buy("ACME", 3, dec!(5), dec!(95)),
                ],
            )
            .unwrap();

        let reopened = active(&session, "ACME");
        let old = session
            .instruments()
            .iter()
            .find(|i| i.status == InstrumentStatus::Disabled)
            .unwrap();
        assert_ne!(reopened.id, old.id);
        assert!(reopened.id > old.id);
    }

    #[test]
    fn colors_prefer_unused_then_reuse_lowest_disabled() {
        // Palette of two: third instrument must borrow the color of the
        // lowest-id Disabled instrument.
        let mut session = LedgerSession::from_parts(Vec::new(), HashMap::new(), vec![1, 2]);
        let applier = ChangeApplier::new();

        applier
            .apply_batch(
                &mut session,
                &[
                    buy("AAA", 1, dec!(1), dec!(10)),
                    buy("BBB", 1, dec!(1), dec!(10)),
                    liquidate("AAA", 2, dec!(10)),
                    buy("CCC", 3, dec!(1), dec!(10)),
                ],
            )
            .unwrap();

        assert_eq!(active(&session, "BBB").color_id, 2);
        assert_eq!(active(&session, "CCC").color_id, 1);
    }

    #[test]
    fn batch_with_invalid_record_is_rejected_before_any_mutation() {
        let mut session = empty_session();
        let applier = ChangeApplier::new();

        let mut bad = buy("ACME", 2, dec!(5), dec!(0));
        bad.unit_price = Decimal::ZERO;

        let err = applier
            .apply_batch(
                &mut session,
                &[buy("ACME", 1, dec!(10), dec!(100)), bad],
            )
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(session.find_active_by_ticker("ACME").is_none());
    }

    #[test]
    fn partially_consumed_lot_keeps_remainder() {
        let mut session = empty_session();
        let applier = ChangeApplier::new();

        applier
            .apply_batch(
                &mut session,
                &[
                    buy("ACME", 1, dec!(10), dec!(100)),
                    sell("ACME", 2, dec!(3), dec!(110)),
                ],
            )
            .unwrap();

        let instrument = active(&session, "ACME");
        let lots: &[Lot] = session.lots_for(instrument.id);
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].quantity, dec!(7));
        assert_eq!(lots[0].unit_price, dec!(100));
    }
}
