//! Bounded enumeration of role -> employee assignments
//!
//! Candidates are produced lazily in lexicographic order of the employee index
//! tuple and truncated at a fixed cap. The cap bounds worst-case latency; it
//! says nothing about which assignments are good.

/// Default number of candidates considered per request.
pub const DEFAULT_CANDIDATE_CAP: usize = 1000;

/// One employee index per role, position i is the assignee of role i.
pub type Assignment = Vec<usize>;

/// k-permutations of `0..n` in lexicographic order.
pub struct Permutations {
    n: usize,
    k: usize,
    current: Vec<usize>,
    used: Vec<bool>,
    started: bool,
    done: bool,
}

impl Permutations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            k,
            current: Vec::with_capacity(k),
            used: vec![false; n],
            started: false,
            done: k > n,
        }
    }

    /// Fill positions from `self.current.len()` up to k with the smallest free indices.
    fn fill_from(&mut self) {
        let mut candidate = 0;
        while self.current.len() < self.k {
            while self.used[candidate] {
                candidate += 1;
            }
            self.used[candidate] = true;
            self.current.push(candidate);
            candidate += 1;
        }
    }

    fn advance(&mut self) -> bool {
        while let Some(last) = self.current.pop() {
            self.used[last] = false;
            if let Some(next) = (last + 1..self.n).find(|&v| !self.used[v]) {
                self.used[next] = true;
                self.current.push(next);
                self.fill_from();
                return true;
            }
        }
        false
    }
}

impl Iterator for Permutations {
    type Item = Assignment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            self.fill_from();
        } else if !self.advance() {
            self.done = true;
            return None;
        }

        Some(self.current.clone())
    }
}

/// Cartesian product `0..n` repeated k times, odometer order.
pub struct Product {
    n: usize,
    current: Vec<usize>,
    started: bool,
    done: bool,
}

impl Product {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            current: vec![0; k],
            started: false,
            done: n == 0 && k > 0,
        }
    }
}

impl Iterator for Product {
    type Item = Assignment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            return Some(self.current.clone());
        }

        for position in (0..self.current.len()).rev() {
            if self.current[position] + 1 < self.n {
                self.current[position] += 1;
                for later in self.current.iter_mut().skip(position + 1) {
                    *later = 0;
                }
                return Some(self.current.clone());
            }
        }

        self.done = true;
        None
    }
}

/// Enumerate up to `cap` candidate assignments.
///
/// With at least as many employees as roles every candidate uses distinct
/// employees. Otherwise employees may fill several roles. An empty pool
/// yields nothing.
pub fn enumerate_assignments(employee_count: usize, role_count: usize, cap: usize) -> Vec<Assignment> {
    if employee_count == 0 {
        return Vec::new();
    }

    if employee_count >= role_count {
        Permutations::new(employee_count, role_count).take(cap).collect()
    } else {
        Product::new(employee_count, role_count).take(cap).collect()
    }
}

/// Deterministic degraded assignment: role i gets employee `i % employee_count`.
pub fn fallback_assignment(employee_count: usize, role_count: usize) -> Option<Assignment> {
    if employee_count == 0 {
        return None;
    }
    Some((0..role_count).map(|i| i % employee_count).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutations_lexicographic() {
        let perms: Vec<_> = Permutations::new(3, 2).collect();
        assert_eq!(
            perms,
            vec![vec![0, 1], vec![0, 2], vec![1, 0], vec![1, 2], vec![2, 0], vec![2, 1]]
        );
    }

    #[test]
    fn test_full_permutations_count() {
        assert_eq!(Permutations::new(4, 4).count(), 24);
        assert_eq!(Permutations::new(5, 3).count(), 60);
    }

    #[test]
    fn test_zero_roles_yield_single_empty_assignment() {
        let perms: Vec<_> = Permutations::new(3, 0).collect();
        assert_eq!(perms, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_product_order() {
        let product: Vec<_> = Product::new(2, 3).collect();
        assert_eq!(product.len(), 8);
        assert_eq!(product[0], vec![0, 0, 0]);
        assert_eq!(product[1], vec![0, 0, 1]);
        assert_eq!(product[7], vec![1, 1, 1]);
    }

    #[test]
    fn test_cap_truncates_in_generation_order() {
        let candidates = enumerate_assignments(10, 10, DEFAULT_CANDIDATE_CAP);
        assert_eq!(candidates.len(), DEFAULT_CANDIDATE_CAP);
        assert_eq!(candidates[0], (0..10).collect::<Vec<_>>());
        assert!(candidates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_small_pool_uses_product() {
        let candidates = enumerate_assignments(1, 3, DEFAULT_CANDIDATE_CAP);
        assert_eq!(candidates, vec![vec![0, 0, 0]]);
    }

    #[test]
    fn test_empty_pool() {
        assert!(enumerate_assignments(0, 2, DEFAULT_CANDIDATE_CAP).is_empty());
        assert!(fallback_assignment(0, 2).is_none());
    }

    #[test]
    fn test_fallback_wraps_around() {
        assert_eq!(fallback_assignment(2, 5), Some(vec![0, 1, 0, 1, 0]));
    }
}
