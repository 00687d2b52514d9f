//! Reciprocal Rank Fusion over independently ranked candidate lists.
//!
//! A candidate at zero-based rank `r` in list `i` contributes `w_i / (k + r + 1)`. Fused items
//! carry the negated sum as `score`, so lower is better like a distance.

use std::{
	cmp::Ordering,
	collections::{HashMap, HashSet},
};

use crate::{clause::FusionClause, item::ResultItem};

pub const DEFAULT_RRF_K: u32 = 60;

const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FusionOptions {
	/// Credit ids absent from a list with that list's `default` rank, when the query sets one.
	pub synthesize_default_rank: bool,
}

struct FusedCandidate {
	item: ResultItem,
	rrf_score: f64,
}

/// Fuses `query_results` (one list per sub-query, in `clause.ranks` order).
///
/// The first occurrence of an id fixes its fields; later occurrences only add to its score.
pub fn fuse(
	query_results: Vec<Vec<ResultItem>>,
	clause: &FusionClause,
	options: FusionOptions,
) -> Vec<ResultItem> {
	let k = f64::from(clause.k.unwrap_or(DEFAULT_RRF_K));
	let weights = effective_weights(clause);
	let mut fused: Vec<FusedCandidate> = Vec::new();
	let mut by_id: HashMap<String, usize> = HashMap::new();
	let mut absent_credit: Vec<(f64, HashSet<String>)> = Vec::new();

	for (query_idx, results) in query_results.into_iter().enumerate() {
		let weight = weights.get(query_idx).copied().unwrap_or(DEFAULT_WEIGHT);

		if options.synthesize_default_rank
			&& let Some(default_rank) =
				clause.ranks.get(query_idx).and_then(|query| query.default_rank)
		{
			let seen = results.iter().map(|item| item.id.clone()).collect();

			absent_credit.push((weight / (k + default_rank + 1.0), seen));
		}

		for (rank, item) in results.into_iter().enumerate() {
			let contribution = weight / (k + rank as f64 + 1.0);

			match by_id.get(&item.id).copied() {
				Some(slot) => fused[slot].rrf_score += contribution,
				None => {
					by_id.insert(item.id.clone(), fused.len());
					fused.push(FusedCandidate { item, rrf_score: contribution });
				},
			}
		}
	}

	for (credit, seen) in &absent_credit {
		for candidate in fused.iter_mut().filter(|candidate| !seen.contains(&candidate.item.id)) {
			candidate.rrf_score += credit;
		}
	}

	fused.sort_by(|left, right| cmp_f64_desc(left.rrf_score, right.rrf_score));

	fused
		.into_iter()
		.map(|FusedCandidate { mut item, rrf_score }| {
			item.score = Some(-rrf_score);
			item.distance = None;

			item
		})
		.collect()
}

/// Explicit weights (positional) or all ones, divided by their sum when `normalize` is set.
fn effective_weights(clause: &FusionClause) -> Vec<f64> {
	let mut weights = match clause.weights.as_ref() {
		Some(weights) => weights.clone(),
		None => vec![DEFAULT_WEIGHT; clause.ranks.len()],
	};

	if clause.normalize.unwrap_or(false) {
		let sum: f64 = weights.iter().sum();

		if sum != 0.0 {
			for weight in &mut weights {
				*weight /= sum;
			}
		}
	}

	weights
}

fn cmp_f64_desc(a: f64, b: f64) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
