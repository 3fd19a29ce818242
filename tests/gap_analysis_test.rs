use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stockdash::application::gap_analysis::{GapOffsets, analyze};
use stockdash::application::tables::{WEEKLY_GAP_COLUMNS, weekly_gap_table};
use stockdash::domain::market::types::PriceBar;
use stockdash::domain::market::weekly::GapKpi;

fn bar(date: NaiveDate, open: Decimal, close: Decimal, volume: Decimal) -> PriceBar {
    PriceBar {
        timestamp: Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap()),
        open,
        high: open.max(close) + dec!(1),
        low: open.min(close) - dec!(1),
        close,
        volume,
    }
}

/// Six weeks of business days starting Monday 2024-01-01
fn six_weeks() -> Vec<PriceBar> {
    let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut bars = Vec::new();
    for week in 0..6i64 {
        for day in 0..5i64 {
            let date = monday + Duration::weeks(week) + Duration::days(day);
            let base = Decimal::from(100 + week * 5 + day);
            bars.push(bar(date, base, base + dec!(0.5), dec!(1000)));
        }
    }
    bars
}

#[test]
fn test_one_business_week_aggregates_into_one_row() {
    let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let opens = [dec!(100), dec!(101), dec!(99), dec!(102), dec!(103)];
    let closes = [dec!(101), dec!(100), dec!(102), dec!(103), dec!(104)];
    let bars: Vec<PriceBar> = (0..5)
        .map(|i| bar(monday + Duration::days(i as i64), opens[i], closes[i], dec!(10)))
        .collect();

    let analysis = analyze(&bars, GapOffsets::default());
    assert_eq!(analysis.weeks.len(), 1);

    let week = &analysis.weeks[0];
    assert_eq!(week.opening_week, dec!(100));
    assert_eq!(week.closing_week, dec!(104));
    assert_eq!(week.highest_in_week, bars.iter().map(|b| b.high).max().unwrap());
    assert_eq!(week.lowest_in_week, bars.iter().map(|b| b.low).min().unwrap());
    assert_eq!(week.volume_sum, dec!(50));

    // No later weeks, so no gap and no summary
    assert_eq!(week.gap_percent, None);
    assert!(analysis.summary.is_none());
}

#[test]
fn test_weekly_invariants_hold() {
    let bars = six_weeks();
    let analysis = analyze(&bars, GapOffsets::default());

    assert_eq!(analysis.weeks.len(), 6);
    for week in &analysis.weeks {
        assert!(week.highest_in_week >= week.lowest_in_week);
        assert_eq!(week.volume_sum, dec!(1000) * Decimal::from(week.bar_count));

        match week.gap {
            Some(gap) if gap > Decimal::ZERO => assert_eq!(week.kpi(), GapKpi::Up),
            Some(gap) if gap < Decimal::ZERO => assert_eq!(week.kpi(), GapKpi::Down),
            _ => assert_eq!(week.kpi(), GapKpi::Neutral),
        }
    }
    let total: Decimal = analysis.weeks.iter().map(|w| w.volume_sum).sum();
    assert_eq!(total, bars.iter().map(|b| b.volume).sum::<Decimal>());
}

#[test]
fn test_default_offsets_leave_last_two_weeks_without_gap() {
    let analysis = analyze(&six_weeks(), GapOffsets::default());
    let with_gap = analysis.weeks.iter().filter(|w| w.gap.is_some()).count();
    assert_eq!(with_gap, 4);

    // close of week 3 minus open of week 1, over open of week 2
    let first = &analysis.weeks[0];
    assert_eq!(first.gap, Some(dec!(114.5) - dec!(100)));
    assert_eq!(
        first.gap_percent.map(|p| p.round_dp(4)),
        Some((dec!(14.5) / dec!(105) * dec!(100)).round_dp(4))
    );
}

#[test]
fn test_same_week_offsets() {
    let offsets = GapOffsets {
        close_lead: 0,
        base_lead: 0,
    };
    let analysis = analyze(&six_weeks(), offsets);

    assert!(analysis.weeks.iter().all(|w| w.gap.is_some()));
    let summary = analysis.summary.unwrap();
    // Every week moves by 4.5, so the lowest open gives the biggest percentage
    assert_eq!(summary.week_number, 1);
}

#[test]
fn test_empty_input_gives_empty_analysis() {
    let analysis = analyze(&[], GapOffsets::default());
    assert!(analysis.is_empty());
    assert!(analysis.daily.is_empty());
    assert!(analysis.summary.is_none());
    assert!(weekly_gap_table(&analysis.weeks).is_empty());
}

#[test]
fn test_weekly_table_layout() {
    let analysis = analyze(&six_weeks(), GapOffsets::default());
    let table = weekly_gap_table(&analysis.weeks);

    assert_eq!(table.columns, WEEKLY_GAP_COLUMNS.to_vec());
    assert_eq!(table.row_count(), 6);
    assert_eq!(table.rows[0][1], "2024-01-01 - 2024-01-05");
    assert!(table.rows[0][2].starts_with('▲'));
    assert!(table.rows[5][2].ends_with("n/a"));
}
