use crate::core::layout::{plate_wells, quadrant_wells};
use crate::core::model::{
    CompoundTable, PlateType, Quadrant, QuadrantTable, Well, WellArea, WellRecord,
};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CompletionSummary {
    pub filled: usize,
    pub outliers: usize,
    pub duplicates: usize,
}

/// Groups records by compound, keeping the order compounds first appear in.
pub fn group_by_compound(records: Vec<WellRecord>) -> Vec<(String, Vec<WellRecord>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<WellRecord>)> = Vec::new();
    for rec in records {
        match index.get(&rec.compound) {
            Some(&i) => groups[i].1.push(rec),
            None => {
                index.insert(rec.compound.clone(), groups.len());
                groups.push((rec.compound.clone(), vec![rec]));
            }
        }
    }
    groups
}

/// Completes one compound's records to the plate's canonical well set.
///
/// Labels that do not decode to a well on `plate` are dropped. Canonical
/// wells with no record get a zero area. When a well occurs twice the first
/// record wins. The result is in row-major order.
pub fn complete(records: &[WellRecord], plate: PlateType) -> (CompoundTable, CompletionSummary) {
    let mut summary = CompletionSummary::default();
    let mut observed: HashMap<Well, f64> = HashMap::with_capacity(records.len());
    for rec in records {
        match Well::parse(&rec.well) {
            Ok(well) if well.in_plate(plate) => {
                if observed.contains_key(&well) {
                    summary.duplicates += 1;
                } else {
                    observed.insert(well, rec.area);
                }
            }
            _ => {
                log::debug!("dropping well {:?} ({})", rec.well, rec.compound);
                summary.outliers += 1;
            }
        }
    }

    let rows = plate_wells(plate)
        .into_iter()
        .map(|well| {
            let area = observed.get(&well).copied().unwrap_or_else(|| {
                summary.filled += 1;
                0.0
            });
            WellArea { well, area }
        })
        .collect();
    (CompoundTable { rows }, summary)
}

/// Splits a 384-plate table into its four quadrants.
///
/// A quadrant with exactly 96 rows is relabeled positionally onto A1..H12;
/// anything else keeps its 384-plate labels.
pub fn split_quadrants(table: &CompoundTable) -> Vec<QuadrantTable> {
    let p96 = plate_wells(PlateType::P96);
    Quadrant::ALL
        .iter()
        .map(|&quadrant| {
            let members: HashSet<Well> = quadrant_wells(quadrant).into_iter().collect();
            let rows: Vec<WellArea> = table
                .rows
                .iter()
                .filter(|r| members.contains(&r.well))
                .copied()
                .collect();
            if rows.len() == p96.len() {
                let rows = rows
                    .iter()
                    .zip(&p96)
                    .map(|(r, &well)| WellArea { well, area: r.area })
                    .collect();
                QuadrantTable {
                    quadrant,
                    remapped: true,
                    table: CompoundTable { rows },
                }
            } else {
                QuadrantTable {
                    quadrant,
                    remapped: false,
                    table: CompoundTable { rows },
                }
            }
        })
        .collect()
}

/// `Compound X` -> `compound_x`.
pub fn compound_slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}
