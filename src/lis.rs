//! Longest increasing subsequence, used to keep as many keyed nodes in place as possible.

/// Returns the ascending positions of a longest strictly increasing run of values in `values`, skipping [`None`]s.
///
/// Patience sorting with binary search: O(n log n).
#[must_use]
pub fn longest_increasing_subsequence<T: Ord + Copy>(values: &[Option<T>]) -> Vec<usize> {
	let mut predecessors: Vec<Option<usize>> = vec![None; values.len()];
	// `tails[k]` is the position and value of the smallest tail of any run of length `k + 1`.
	let mut tails: Vec<(usize, T)> = Vec::new();

	for (i, value) in values.iter().enumerate() {
		let value = match *value {
			Some(value) => value,
			None => continue,
		};

		let length = tails.partition_point(|&(_, tail)| tail < value);
		if length > 0 {
			predecessors[i] = Some(tails[length - 1].0);
		}
		if length == tails.len() {
			tails.push((i, value));
		} else {
			tails[length] = (i, value);
		}
	}

	let mut run = Vec::with_capacity(tails.len());
	let mut cursor = tails.last().map(|&(i, _)| i);
	while let Some(i) = cursor {
		run.push(i);
		cursor = predecessors[i];
	}
	run.reverse();
	run
}

#[cfg(test)]
mod tests {
	use super::longest_increasing_subsequence;

	fn assert_valid(values: &[Option<usize>], run: &[usize]) {
		for pair in run.windows(2) {
			assert!(pair[0] < pair[1], "positions not ascending: {:?}", run);
			assert!(values[pair[0]].unwrap() < values[pair[1]].unwrap(), "values not increasing: {:?}", run);
		}
		for &i in run {
			assert!(values[i].is_some(), "unmatched slot {} in {:?}", i, run);
		}
	}

	#[test]
	fn skips_unmatched() {
		let values = [Some(2), None, Some(3), None, Some(1)];
		let run = longest_increasing_subsequence(&values);
		assert_valid(&values, &run);
		assert_eq!(run, [0, 2]);
	}

	#[test]
	fn empty_and_all_unmatched() {
		assert!(longest_increasing_subsequence::<usize>(&[]).is_empty());
		assert!(longest_increasing_subsequence::<usize>(&[None, None, None]).is_empty());
	}

	#[test]
	fn leading_unmatched() {
		let values = [None, Some(5)];
		assert_eq!(longest_increasing_subsequence(&values), [1]);
	}

	#[test]
	fn swapped_ends() {
		// Keyed `[a, b, c, d] -> [d, b, c, a]`.
		let values = [Some(3), Some(1), Some(2), Some(0)];
		let run = longest_increasing_subsequence(&values);
		assert_valid(&values, &run);
		assert_eq!(run, [1, 2]);
	}

	#[test]
	fn strictly_increasing() {
		let values = [Some(1), Some(1), Some(1)];
		assert_eq!(longest_increasing_subsequence(&values).len(), 1);
	}

	#[test]
	fn maximal_length() {
		let values = [Some(0), Some(8), Some(4), Some(12), Some(2), Some(10), Some(6), Some(14), Some(1), Some(9), Some(5), Some(13), Some(3), Some(11), Some(7), Some(15)];
		let run = longest_increasing_subsequence(&values);
		assert_valid(&values, &run);
		assert_eq!(run.len(), 6);
	}

	#[test]
	fn sorted_input_is_kept_whole() {
		let values: Vec<_> = (0..10).map(Some).collect();
		assert_eq!(longest_increasing_subsequence(&values), (0..10).collect::<Vec<_>>());
	}
}
