use std::collections::HashMap;

/// Removable spatial index over 3-D points: a bucket hash of cubic cells
/// whose side equals the query radius, so a range query only has to visit
/// the 27 cells around the query point before the exact distance test.
///
/// Removal is by assignment: taken points are skipped by every later
/// query, which is all the flood-fill clustering needs.
pub struct CellGrid {
    cell_size: f64,
    cells: HashMap<[i64; 3], Vec<usize>>,
    points: Vec<[f64; 3]>,
    assigned: Vec<bool>,
    next_seed: usize,
    remaining: usize,
}

impl CellGrid {
    pub fn new(points: &[[f64; 3]], cell_size: f64) -> Self {
        debug_assert!(cell_size > 0.0);
        let mut cells: HashMap<[i64; 3], Vec<usize>> = HashMap::new();
        for (index, point) in points.iter().enumerate() {
            cells
                .entry(Self::key(point, cell_size))
                .or_default()
                .push(index);
        }
        Self {
            cell_size,
            cells,
            points: points.to_vec(),
            assigned: vec![false; points.len()],
            next_seed: 0,
            remaining: points.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Removes and returns an arbitrary point still in the index.
    pub fn take_seed(&mut self) -> Option<usize> {
        while self.next_seed < self.points.len() {
            let index = self.next_seed;
            self.next_seed += 1;
            if !self.assigned[index] {
                self.assigned[index] = true;
                self.remaining -= 1;
                return Some(index);
            }
        }
        None
    }

    /// Removes and returns every point strictly within `radius` of
    /// `center`. Points at exactly `radius` are not matched.
    pub fn take_within(&mut self, center: [f64; 3], radius: f64) -> Vec<usize> {
        let radius_sq = radius * radius;
        let lower = Self::key(
            &[center[0] - radius, center[1] - radius, center[2] - radius],
            self.cell_size,
        );
        let upper = Self::key(
            &[center[0] + radius, center[1] + radius, center[2] + radius],
            self.cell_size,
        );

        let mut found = Vec::new();
        for cx in lower[0]..=upper[0] {
            for cy in lower[1]..=upper[1] {
                for cz in lower[2]..=upper[2] {
                    let Some(bucket) = self.cells.get(&[cx, cy, cz]) else {
                        continue;
                    };
                    for &index in bucket {
                        if self.assigned[index] {
                            continue;
                        }
                        if Self::distance_sq(&self.points[index], &center) < radius_sq {
                            found.push(index);
                        }
                    }
                }
            }
        }
        for &index in &found {
            self.assigned[index] = true;
        }
        self.remaining -= found.len();
        found
    }

    fn key(point: &[f64; 3], cell_size: f64) -> [i64; 3] {
        [
            (point[0] / cell_size).floor() as i64,
            (point[1] / cell_size).floor() as i64,
            (point[2] / cell_size).floor() as i64,
        ]
    }

    fn distance_sq(a: &[f64; 3], b: &[f64; 3]) -> f64 {
        let dx = a[0] - b[0];
        let dy = a[1] - b[1];
        let dz = a[2] - b[2];
        dx * dx + dy * dy + dz * dz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_within_is_strict() {
        let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.999, 0.0, 0.0]];
        let mut grid = CellGrid::new(&points, 1.0);
        let seed = grid.take_seed().unwrap();
        assert_eq!(seed, 0);
        let found = grid.take_within(points[0], 1.0);
        // the point at exactly the radius is excluded
        assert_eq!(found, vec![2]);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn taken_points_are_not_returned_again() {
        let points = [[0.0, 0.0, 0.0], [0.1, 0.0, 0.0], [0.2, 0.0, 0.0]];
        let mut grid = CellGrid::new(&points, 1.0);
        grid.take_seed().unwrap();
        assert_eq!(grid.take_within(points[0], 1.0).len(), 2);
        assert!(grid.take_within(points[0], 1.0).is_empty());
        assert!(grid.take_seed().is_none());
        assert!(grid.is_empty());
    }

    #[test]
    fn queries_cross_cell_boundaries() {
        // neighbors straddling a cell edge must still be found
        let points = [[0.99, 0.0, 0.0], [1.01, 0.0, 0.0]];
        let mut grid = CellGrid::new(&points, 1.0);
        grid.take_seed().unwrap();
        assert_eq!(grid.take_within(points[0], 0.5), vec![1]);
    }

    #[test]
    fn negative_coordinates_hash_consistently() {
        let points = [[-0.5, -0.5, -0.5], [-0.6, -0.5, -0.5]];
        let mut grid = CellGrid::new(&points, 1.0);
        grid.take_seed().unwrap();
        assert_eq!(grid.take_within(points[0], 0.5), vec![1]);
    }
}
