//! Fruit Frenzy: reel spins and payline evaluation

use crate::common::traits::{GameModel, RandomSource};
use crate::errors::{ConfigurationError, RandomSourceError};
use crate::games::types::{GameType, LineWin, Outcome, Symbol};
use crate::games::weighted::{ReelStrip, WeightedTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Pay table row as it appears in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayEntry {
    pub symbol: Symbol,
    pub matches: u8,
    pub multiplier: f64,
}

/// Symbol -> run length -> multiplier
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PayTable {
    entries: BTreeMap<Symbol, BTreeMap<u8, f64>>,
}

impl PayTable {
    pub fn build(entries: &[PayEntry]) -> Result<Self, ConfigurationError> {
        let mut table: BTreeMap<Symbol, BTreeMap<u8, f64>> = BTreeMap::new();

        for entry in entries {
            if entry.matches < 2 {
                return Err(ConfigurationError::invalid(
                    format!("paytable.{}.matches", entry.symbol),
                    entry.matches,
                    "a winning run needs at least two symbols",
                ));
            }
            if !entry.multiplier.is_finite() || entry.multiplier < 0.0 {
                return Err(ConfigurationError::invalid(
                    format!("paytable.{}.{}", entry.symbol, entry.matches),
                    entry.multiplier,
                    "multiplier must be a non-negative number",
                ));
            }
            let row = table.entry(entry.symbol).or_default();
            if row.insert(entry.matches, entry.multiplier).is_some() {
                return Err(ConfigurationError::ValidationFailed(format!(
                    "duplicate paytable entry for {} x{}",
                    entry.symbol, entry.matches
                )));
            }
        }

        for (symbol, row) in &table {
            let multipliers: Vec<f64> = row.values().copied().collect();
            if multipliers.windows(2).any(|w| w[1] < w[0]) {
                warn!("paytable for {} is not monotone in match count: {:?}", symbol, row);
            }
        }

        Ok(Self { entries: table })
    }

    /// Multiplier for a run of `run` identical symbols, if that run pays
    pub fn multiplier(&self, symbol: Symbol, run: usize) -> Option<f64> {
        let run = u8::try_from(run).ok()?;
        self.entries.get(&symbol)?.get(&run).copied()
    }

    /// Whether the symbol has any entry at all
    pub fn pays(&self, symbol: Symbol) -> bool {
        self.entries.contains_key(&symbol)
    }

    pub fn to_entries(&self) -> Vec<PayEntry> {
        self.entries
            .iter()
            .flat_map(|(symbol, row)| {
                row.iter().map(move |(matches, multiplier)| PayEntry {
                    symbol: *symbol,
                    matches: *matches,
                    multiplier: *multiplier,
                })
            })
            .collect()
    }
}

/// Visible symbols, stored reel by reel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelGrid {
    reels: Vec<Vec<Symbol>>,
}

impl ReelGrid {
    /// Build from per-reel windows; every reel must show the same number of rows
    pub fn from_reels(reels: Vec<Vec<Symbol>>) -> Result<Self, ConfigurationError> {
        let rows = reels.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || reels.iter().any(|r| r.len() != rows) {
            return Err(ConfigurationError::ValidationFailed(
                "reel grid must be rectangular and non-empty".to_string(),
            ));
        }
        Ok(Self { reels })
    }

    /// Build from rows read left to right
    pub fn from_rows(rows: Vec<Vec<Symbol>>) -> Result<Self, ConfigurationError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 || rows.iter().any(|r| r.len() != width) {
            return Err(ConfigurationError::ValidationFailed(
                "reel grid must be rectangular and non-empty".to_string(),
            ));
        }
        let reels = (0..width)
            .map(|reel| rows.iter().map(|row| row[reel]).collect())
            .collect();
        Ok(Self { reels })
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    pub fn row_count(&self) -> usize {
        self.reels.first().map_or(0, Vec::len)
    }

    /// Payline for row `row`, left to right; `None` past the last row
    pub fn payline(&self, row: usize) -> Option<Vec<Symbol>> {
        self.reels.iter().map(|reel| reel.get(row).copied()).collect()
    }

    pub fn rows(&self) -> Vec<Vec<Symbol>> {
        (0..self.row_count()).filter_map(|row| self.payline(row)).collect()
    }
}

/// Result of scoring a grid
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpinEvaluation {
    pub lines: Vec<LineWin>,
    pub total_payout: f64,
    pub near_miss: bool,
}

/// Best-paying run on one line, plus whether the line shows a near miss
///
/// Every start position is tried; the line pays its single largest candidate
/// (leftmost on ties), never a sum of overlapping runs.
pub fn evaluate_line(line: &[Symbol], paytable: &PayTable) -> (Option<(usize, Symbol, usize, f64)>, bool) {
    let mut best: Option<(usize, Symbol, usize, f64)> = None;
    let mut saw_pair = false;

    for start in 0..line.len() {
        let symbol = line[start];
        if !paytable.pays(symbol) {
            continue;
        }
        let run = line[start..].iter().take_while(|s| **s == symbol).count();
        match paytable.multiplier(symbol, run) {
            Some(multiplier) => {
                if best.map_or(true, |(_, _, _, m)| multiplier > m) {
                    best = Some((start, symbol, run, multiplier));
                }
            }
            None if run == 2 => saw_pair = true,
            None => {}
        }
    }

    let near_miss = best.is_none() && saw_pair;
    (best, near_miss)
}

/// Score every payline of a grid independently and sum the line wins
pub fn evaluate(grid: &ReelGrid, paytable: &PayTable, wager: f64) -> SpinEvaluation {
    let mut evaluation = SpinEvaluation::default();

    for (row, line) in grid.rows().into_iter().enumerate() {
        let (best, near_miss) = evaluate_line(&line, paytable);
        evaluation.near_miss |= near_miss;
        if let Some((start, symbol, run, multiplier)) = best {
            let payout = wager * multiplier;
            evaluation.total_payout += payout;
            evaluation.lines.push(LineWin {
                row,
                start,
                symbol,
                run,
                multiplier,
                payout,
            });
        }
    }

    evaluation
}

/// Configured slot machine: one strip per reel, a visible window and a pay table
#[derive(Debug, Clone, PartialEq)]
pub struct SlotMachine {
    strips: Vec<ReelStrip<Symbol>>,
    rows: usize,
    paytable: PayTable,
}

impl SlotMachine {
    pub fn new(
        reels: &[WeightedTable<Symbol>],
        rows: usize,
        paytable: PayTable,
    ) -> Result<Self, ConfigurationError> {
        if reels.is_empty() {
            return Err(ConfigurationError::MissingRequired("slots.reels".to_string()));
        }
        if rows == 0 {
            return Err(ConfigurationError::invalid("slots.rows", rows, "must be > 0"));
        }
        let strips = reels.iter().map(ReelStrip::from_table).collect();
        Ok(Self { strips, rows, paytable })
    }

    pub fn paytable(&self) -> &PayTable {
        &self.paytable
    }

    pub fn reel_count(&self) -> usize {
        self.strips.len()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// One offset per reel; rows on a reel are consecutive strip stops
    pub fn spin<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<ReelGrid, RandomSourceError> {
        let reels = self
            .strips
            .iter()
            .map(|strip| strip.spin(&mut *rng, self.rows))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ReelGrid { reels })
    }
}

impl GameModel for SlotMachine {
    fn game_type(&self) -> GameType {
        GameType::Slots
    }

    fn play_round(&self, wager: f64, rng: &mut dyn RandomSource) -> Result<Outcome, RandomSourceError> {
        let grid = self.spin(rng)?;
        let evaluation = evaluate(&grid, &self.paytable, wager);
        Ok(Outcome::SlotWin {
            grid: grid.rows(),
            lines: evaluation.lines,
            near_miss: evaluation.near_miss,
            payout: evaluation.total_payout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::random::SequenceSource;
    use Symbol::*;

    fn entry(symbol: Symbol, matches: u8, multiplier: f64) -> PayEntry {
        PayEntry { symbol, matches, multiplier }
    }

    fn fruit_paytable() -> PayTable {
        PayTable::build(&[
            entry(Lemon, 3, 0.4),
            entry(Lemon, 4, 0.8),
            entry(Lemon, 5, 3.0),
            entry(Cherry, 3, 0.3),
            entry(Cherry, 4, 0.6),
            entry(Cherry, 5, 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_longest_run_pays_not_the_sum() {
        let paytable = fruit_paytable();
        let (best, _) = evaluate_line(&[Lemon, Lemon, Lemon, Lemon, Lemon], &paytable);
        let (start, symbol, run, multiplier) = best.unwrap();

        assert_eq!((start, symbol, run), (0, Lemon, 5));
        assert_eq!(multiplier, 3.0);
    }

    #[test]
    fn test_run_starting_mid_line_is_found() {
        let paytable = PayTable::build(&[entry(Cherry, 2, 0.1), entry(Lemon, 3, 0.4)]).unwrap();
        let grid = ReelGrid::from_rows(vec![vec![Cherry, Cherry, Lemon, Lemon, Lemon]]).unwrap();
        let evaluation = evaluate(&grid, &paytable, 10.0);

        assert_eq!(evaluation.lines.len(), 1);
        let win = &evaluation.lines[0];
        assert_eq!((win.start, win.symbol, win.run), (2, Lemon, 3));
        assert!((evaluation.total_payout - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_is_taken_across_symbols() {
        // Two qualifying runs of different symbols on one line: only the better one pays
        let paytable = PayTable::build(&[entry(Cherry, 2, 5.0), entry(Lemon, 3, 0.4)]).unwrap();
        let grid = ReelGrid::from_rows(vec![vec![Cherry, Cherry, Lemon, Lemon, Lemon]]).unwrap();
        let evaluation = evaluate(&grid, &paytable, 1.0);

        assert_eq!(evaluation.lines.len(), 1);
        assert_eq!(evaluation.lines[0].symbol, Cherry);
        assert!((evaluation.total_payout - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_lines_pay_independently() {
        let paytable = fruit_paytable();
        let grid = ReelGrid::from_rows(vec![
            vec![Lemon, Lemon, Lemon, Grape, Seven],
            vec![Grape, Seven, Diamond, Orange, Scatter],
            vec![Cherry, Cherry, Cherry, Cherry, Lemon],
        ])
        .unwrap();
        let evaluation = evaluate(&grid, &paytable, 10.0);

        assert_eq!(evaluation.lines.len(), 2);
        assert!((evaluation.total_payout - (4.0 + 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_pair_is_a_near_miss_not_an_error() {
        let paytable = fruit_paytable();
        let grid = ReelGrid::from_rows(vec![vec![Cherry, Cherry, Grape, Orange, Seven]]).unwrap();
        let evaluation = evaluate(&grid, &paytable, 10.0);

        assert!(evaluation.lines.is_empty());
        assert!(evaluation.near_miss);
        assert_eq!(evaluation.total_payout, 0.0);
    }

    #[test]
    fn test_paytable_validation() {
        assert!(PayTable::build(&[entry(Seven, 1, 2.0)]).is_err());
        assert!(PayTable::build(&[entry(Seven, 3, -1.0)]).is_err());
        assert!(PayTable::build(&[entry(Seven, 3, 1.0), entry(Seven, 3, 2.0)]).is_err());
        // Non-monotone tables are allowed, only logged
        assert!(PayTable::build(&[entry(Seven, 3, 5.0), entry(Seven, 4, 1.0)]).is_ok());
    }

    #[test]
    fn test_rows_on_a_reel_come_from_consecutive_stops() {
        let reel = WeightedTable::build(vec![(Cherry, 1), (Lemon, 1), (Orange, 1), (Grape, 1)]).unwrap();
        let machine = SlotMachine::new(&[reel.clone(), reel], 3, fruit_paytable()).unwrap();

        // First reel starts at stop 3 (Grape), second at stop 0 (Cherry)
        let mut rng = SequenceSource::new([0.8, 0.1]);
        let grid = machine.spin(&mut rng).unwrap();

        assert_eq!(grid.payline(0), Some(vec![Grape, Cherry]));
        assert_eq!(grid.payline(1), Some(vec![Cherry, Lemon]));
        assert_eq!(grid.payline(2), Some(vec![Lemon, Orange]));
    }

    #[test]
    fn test_payline_past_last_row_is_none() {
        let reel = WeightedTable::build(vec![(Cherry, 1), (Lemon, 1)]).unwrap();
        let machine = SlotMachine::new(&[reel.clone(), reel], 3, fruit_paytable()).unwrap();
        let grid = machine.spin(&mut SequenceSource::new([0.1, 0.1])).unwrap();

        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.payline(3), None);
        assert_eq!(grid.rows().len(), 3);
    }

    #[test]
    fn test_exhausted_source_fails_the_round() {
        let reel = WeightedTable::build(vec![(Cherry, 1)]).unwrap();
        let machine = SlotMachine::new(&[reel.clone(), reel], 3, fruit_paytable()).unwrap();
        let mut rng = SequenceSource::new([0.5]);

        assert!(machine.play_round(1.0, &mut rng).is_err());
    }
}
