//! Scan over a resident [`TraceBlock`].
//!
//! Useful for small experiments and tests: it behaves like any other [`TraceScan`] but
//! "reading" a shot only copies its traces out of the block.
use super::{ShotSummary, TraceBlock, TraceScan};
use crate::geometry_errors::GeometryError;

#[derive(Debug, Clone)]
pub struct MemoryScan {
    block: TraceBlock,
    groups: Vec<Vec<usize>>,
    summaries: Vec<ShotSummary>,
}

impl MemoryScan {
    pub fn new(block: TraceBlock) -> Self {
        let groups = block.shot_groups();
        let summaries = groups
            .iter()
            .filter_map(|g| ShotSummary::from_headers(g.iter().map(|&i| &block.headers()[i])))
            .collect();
        MemoryScan {
            block,
            groups,
            summaries,
        }
    }

    pub fn block(&self) -> &TraceBlock {
        &self.block
    }
}

impl TraceScan for MemoryScan {
    fn summaries(&self) -> &[ShotSummary] {
        &self.summaries
    }

    fn read_shot(&self, shot: usize) -> Result<TraceBlock, GeometryError> {
        let group = self
            .groups
            .get(shot)
            .ok_or(GeometryError::ShotIndexOutOfBounds {
                index: shot,
                nsrc: self.groups.len(),
            })?;
        Ok(self.block.select(group))
    }
}

#[cfg(test)]
mod memory_scan_test {
    use super::*;
    use crate::traces::TraceHeader;

    fn block() -> TraceBlock {
        let headers = [(1, 0), (1, 10), (2, 0), (2, 10), (2, 20)]
            .into_iter()
            .map(|(record, gx)| TraceHeader {
                field_record: record,
                group_x: gx,
                ns: 101,
                dt: 2000,
                ..Default::default()
            })
            .collect::<Vec<_>>();
        let data = vec![vec![0.0; 101]; headers.len()];
        TraceBlock::new(headers, data).unwrap()
    }

    #[test]
    fn test_memory_scan() {
        let scan = MemoryScan::new(block());
        assert_eq!(scan.nshots(), 2);
        assert_eq!(scan.summaries()[1].ntraces, 3);
        assert_eq!(scan.total_samples(), 5 * 101);
        assert_eq!(scan.total_samples(), scan.block().total_samples());

        let shot = scan.read_shot(1).unwrap();
        assert_eq!(shot.ntraces(), 3);
        assert_eq!(shot.data().len(), 3);
        assert_eq!(
            scan.read_shot(2),
            Err(GeometryError::ShotIndexOutOfBounds { index: 2, nsrc: 2 })
        );
    }
}
