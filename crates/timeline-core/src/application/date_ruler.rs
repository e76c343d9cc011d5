//! Date ruler: evenly spaced tick marks across the flow's date window.
//!
//! The ruler is visual alignment only. Node positions are free canvas
//! coordinates and nothing snaps to or schedules against these ticks.

use chrono::NaiveDate;

use crate::domain::flow::Flow;

/// One tick on the ruler
#[derive(Debug, Clone, PartialEq)]
pub struct RulerTick {
    pub date: NaiveDate,
    /// Screen x coordinate across the canvas width
    pub x: f64,
}

/// Ticks dividing the flow's date window evenly across the given width.
///
/// `tick_count` is the number of intervals; the result has `tick_count + 1`
/// ticks including both endpoints. Degenerate windows (end before or equal
/// to start) or a zero count produce a single tick at the start.
pub fn ticks(flow: &Flow, canvas_width: f64, tick_count: u32) -> Vec<RulerTick> {
    let total_days = (flow.end_date - flow.start_date).num_days();
    if total_days <= 0 || tick_count == 0 {
        return vec![RulerTick {
            date: flow.start_date,
            x: 0.0,
        }];
    }

    (0..=tick_count)
        .map(|i| {
            let fraction = f64::from(i) / f64::from(tick_count);
            let day_offset = (total_days as f64 * fraction).round() as i64;
            RulerTick {
                date: flow.start_date + chrono::Duration::days(day_offset),
                x: canvas_width * fraction,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flow::Flow;

    fn window(start: (i32, u32, u32), end: (i32, u32, u32)) -> Flow {
        Flow::template(
            "w",
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
    }

    #[test]
    fn ticks_span_the_window_evenly() {
        let flow = window((2024, 1, 1), (2024, 1, 31));
        let ticks = ticks(&flow, 900.0, 6);

        assert_eq!(ticks.len(), 7);
        assert_eq!(ticks[0].date, flow.start_date);
        assert_eq!(ticks[0].x, 0.0);
        assert_eq!(ticks[6].date, flow.end_date);
        assert_eq!(ticks[6].x, 900.0);
        assert_eq!(ticks[3].x, 450.0);
    }

    #[test]
    fn degenerate_window_yields_single_tick() {
        let flow = window((2024, 3, 10), (2024, 3, 10));
        let ticks = ticks(&flow, 900.0, 6);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].date, flow.start_date);
    }
}
