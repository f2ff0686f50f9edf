//! Exact binomial coefficients over arbitrary-precision integers.
//!
//! [`Binomial`] serves `C(k, n)` ("n choose k") from three sources:
//!
//! 1. a precomputed half-table for `n` up to the lookup limit,
//! 2. a direct product for small `k`,
//! 3. prime factorization (Kummer's theorem) for everything else.
//!
//! All three agree on every input; the split only exists for speed.

use num_bigint::BigUint;
use num_traits::One as _;

use crate::ArithmeticError;

/// `SMALL_COMBINATIONS[n][k]` is `C(k, n)` for the box sizes that occur on
/// a board (a box never holds more than eight tiles).
pub(crate) const SMALL_COMBINATIONS: [[u32; 9]; 9] = [
    [1, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 0, 0, 0, 0, 0, 0, 0],
    [1, 2, 1, 0, 0, 0, 0, 0, 0],
    [1, 3, 3, 1, 0, 0, 0, 0, 0],
    [1, 4, 6, 4, 1, 0, 0, 0, 0],
    [1, 5, 10, 10, 5, 1, 0, 0, 0],
    [1, 6, 15, 20, 15, 6, 1, 0, 0],
    [1, 7, 21, 35, 35, 21, 7, 1, 0],
    [1, 8, 28, 56, 70, 56, 28, 8, 1],
];

/// Below this `k` the direct product is cheaper than factorization.
const SMALL_CHOOSE: usize = 25;

/// Iteration guard for the per-prime digit loop.
const FACTORIZATION_GUARD: usize = 500;

/// Sieve of Eratosthenes over `2..=max`.
///
/// # Examples
///
/// ```
/// use mineprobe_solver::PrimeSieve;
///
/// let sieve = PrimeSieve::new(100);
/// assert!(sieve.is_prime(97)?);
/// assert!(!sieve.is_prime(25)?);
/// assert!(sieve.is_prime(101).is_err());
/// # Ok::<(), mineprobe_solver::ArithmeticError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PrimeSieve {
    max: usize,
    composite: Vec<bool>,
}

impl PrimeSieve {
    /// Sieves every number up to `n` (at least up to 2).
    #[must_use]
    pub fn new(n: usize) -> Self {
        let max = n.max(2);
        let mut composite = vec![false; max + 1];
        let mut i = 2;
        while i * i <= max {
            if !composite[i] {
                for multiple in (i * i..=max).step_by(i) {
                    composite[multiple] = true;
                }
            }
            i += 1;
        }
        Self { max, composite }
    }

    /// Largest number covered by the sieve.
    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Returns whether `n` is prime.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::PrimeOutOfRange`] if `n` is below 2 or
    /// above [`PrimeSieve::max`].
    pub fn is_prime(&self, n: usize) -> Result<bool, ArithmeticError> {
        if n <= 1 || n > self.max {
            return Err(ArithmeticError::PrimeOutOfRange { n, max: self.max });
        }
        Ok(!self.composite[n])
    }
}

/// Exact binomial coefficient calculator.
///
/// Built once per [`Solver`](crate::Solver) and shared by every query,
/// including speculative sub-queries.
///
/// # Examples
///
/// ```
/// use mineprobe_solver::Binomial;
///
/// let binomial = Binomial::new(1000, 20);
/// assert_eq!(binomial.generate(5, 12)?.to_string(), "792");
/// assert_eq!(binomial.generate(3, 100)?.to_string(), "161700");
/// assert!(binomial.generate(3, 1001).is_err());
/// # Ok::<(), mineprobe_solver::ArithmeticError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Binomial {
    max: usize,
    lookup_limit: usize,
    sieve: PrimeSieve,
    /// `table[n][k]` holds `C(k, n)` for `k <= n / 2`.
    table: Vec<Vec<BigUint>>,
}

impl Binomial {
    /// Creates a calculator accepting `n <= max`, with a precomputed table
    /// for `n <= lookup` (at least 10).
    #[must_use]
    pub fn new(max: usize, lookup: usize) -> Self {
        let lookup_limit = lookup.max(10);
        let mut table: Vec<Vec<BigUint>> = Vec::with_capacity(lookup_limit + 1);
        table.push(vec![BigUint::one()]);
        for n in 1..=lookup_limit {
            let prev = &table[n - 1];
            let at = |k: usize| -> BigUint {
                let k = k.min(n - 1 - k);
                prev[k].clone()
            };
            let mut row = Vec::with_capacity(n / 2 + 1);
            row.push(BigUint::one());
            for k in 1..=n / 2 {
                row.push(at(k - 1) + at(k));
            }
            table.push(row);
        }

        Self {
            max,
            lookup_limit,
            sieve: PrimeSieve::new(max),
            table,
        }
    }

    /// Largest `n` accepted by [`Binomial::generate`].
    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Returns `C(k, n)`, the number of ways to choose `k` items from `n`.
    ///
    /// `C(0, 0)` is 1.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::BinomialDomain`] unless `1 <= n <= max`
    /// and `k <= n`, and propagates factorization failures.
    pub fn generate(&self, k: usize, n: usize) -> Result<BigUint, ArithmeticError> {
        if n == 0 && k == 0 {
            return Ok(BigUint::one());
        }
        if n < 1 || n > self.max || k > n {
            return Err(ArithmeticError::BinomialDomain {
                k,
                n,
                max: self.max,
            });
        }

        let choose = k.min(n - k);
        if n <= self.lookup_limit {
            Ok(self.table[n][choose].clone())
        } else if choose < SMALL_CHOOSE {
            Ok(Self::combination(choose, n))
        } else {
            self.combination_large(choose, n)
        }
    }

    /// Computes `C(k, n)` as a ratio of falling products.
    ///
    /// # Panics
    ///
    /// Panics if `k > n`.
    #[must_use]
    pub fn combination(k: usize, n: usize) -> BigUint {
        let range = k.min(n - k);
        let mut top = BigUint::one();
        let mut bottom = BigUint::one();
        for i in 0..range {
            top *= n - i;
            bottom *= i + 1;
        }
        top / bottom
    }

    /// Computes `C(k, n)` from the prime factorization given by Kummer's
    /// theorem: the power of `p` dividing `C(k, n)` is the number of borrows
    /// when subtracting `k` from `n` in base `p`.
    ///
    /// # Errors
    ///
    /// Returns [`ArithmeticError::PrimeOutOfRange`] if `n` exceeds the sieve
    /// and [`ArithmeticError::FactorizationRunaway`] if the digit loop for a
    /// prime fails to terminate.
    ///
    /// # Panics
    ///
    /// Panics if `k > n`.
    pub fn combination_large(&self, k: usize, n: usize) -> Result<BigUint, ArithmeticError> {
        if k == 0 || k == n {
            return Ok(BigUint::one());
        }
        let half = n / 2;
        let k = if k > half { n - k } else { k };
        let nk = n - k;
        let root = n.isqrt();

        let mut result = BigUint::one();
        for prime in 2..=n {
            if !self.sieve.is_prime(prime)? {
                continue;
            }
            if prime > nk {
                result *= prime;
                continue;
            }
            if prime > half {
                continue;
            }
            if prime > root {
                if n % prime < k % prime {
                    result *= prime;
                }
                continue;
            }

            let (mut big_n, mut big_k, mut borrow) = (n, k, 0);
            let mut power = 1usize;
            let mut guard = FACTORIZATION_GUARD;
            while big_n > 0 {
                borrow = usize::from(big_n % prime < big_k % prime + borrow);
                if borrow == 1 {
                    power *= prime;
                }
                big_n /= prime;
                big_k /= prime;
                guard -= 1;
                if guard == 0 {
                    return Err(ArithmeticError::FactorizationRunaway { prime });
                }
            }
            if power > 1 {
                result *= power;
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_sieve_small_primes() {
        let sieve = PrimeSieve::new(50);
        let primes: Vec<usize> = (2..=50).filter(|&n| sieve.is_prime(n).unwrap()).collect();
        assert_eq!(
            primes,
            [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47]
        );
        assert_eq!(
            sieve.is_prime(1),
            Err(ArithmeticError::PrimeOutOfRange { n: 1, max: 50 })
        );
        // squares of primes just below the root must be sieved too
        assert!(!PrimeSieve::new(25).is_prime(25).unwrap());
        assert!(!PrimeSieve::new(49).is_prime(49).unwrap());
    }

    #[test]
    fn test_three_paths_agree_on_known_values() {
        let binomial = Binomial::new(50_000, 20);
        assert_eq!(binomial.table[12][5], BigUint::from(792u32));
        assert_eq!(Binomial::combination(5, 12), BigUint::from(792u32));
        assert_eq!(
            binomial.combination_large(5, 12).unwrap(),
            BigUint::from(792u32)
        );
        assert_eq!(
            binomial.generate(5, 52).unwrap(),
            BigUint::from(2_598_960u32)
        );
    }

    #[test]
    fn test_large_path_matches_table() {
        let table = Binomial::new(1000, 1000);
        let factored = Binomial::new(1000, 10);
        for (k, n) in [(500, 1000), (333, 999), (30, 701), (250, 600)] {
            assert_eq!(
                table.generate(k, n).unwrap(),
                factored.generate(k, n).unwrap(),
                "C({k}, {n})"
            );
        }
    }

    #[test]
    fn test_domain_errors() {
        let binomial = Binomial::new(100, 10);
        assert_eq!(binomial.generate(0, 0).unwrap(), BigUint::one());
        assert_eq!(binomial.generate(0, 100).unwrap(), BigUint::one());
        assert_eq!(
            binomial.generate(5, 4),
            Err(ArithmeticError::BinomialDomain { k: 5, n: 4, max: 100 })
        );
        assert_eq!(
            binomial.generate(1, 0),
            Err(ArithmeticError::BinomialDomain { k: 1, n: 0, max: 100 })
        );
        assert!(binomial.generate(2, 101).is_err());
    }

    #[test]
    fn test_small_combinations_table() {
        for (n, row) in SMALL_COMBINATIONS.iter().enumerate() {
            for (k, &value) in row.iter().enumerate().take(n + 1) {
                assert_eq!(BigUint::from(value), Binomial::combination(k, n));
            }
        }
    }

    proptest! {
        #[test]
        fn test_paths_agree(n in 1usize..300, k_seed in 0usize..300) {
            let k = k_seed % (n + 1);
            let binomial = Binomial::new(1000, 300);
            let via_table = binomial.generate(k, n).unwrap();
            prop_assert_eq!(&via_table, &Binomial::combination(k, n));
            prop_assert_eq!(&via_table, &binomial.combination_large(k, n).unwrap());
        }
    }
}
