use crate::{
	clause::SelectClause,
	field::FieldRef,
	item::{Metadata, ResultItem},
};

#[derive(Debug, Default)]
struct Projection<'a> {
	document: bool,
	embedding: bool,
	scores: bool,
	all_metadata: bool,
	fields: Vec<&'a str>,
}
impl<'a> Projection<'a> {
	fn from_clause(clause: &'a SelectClause) -> Self {
		let mut projection = Self::default();

		for key in &clause.keys {
			match key {
				FieldRef::Id => {},
				FieldRef::Document => projection.document = true,
				FieldRef::Embedding => projection.embedding = true,
				FieldRef::Score | FieldRef::Distance => projection.scores = true,
				FieldRef::Metadata => projection.all_metadata = true,
				FieldRef::Named(name) => projection.fields.push(name.as_str()),
			}
		}

		projection
	}

	fn apply(&self, item: &ResultItem) -> ResultItem {
		let mut out = ResultItem::new(item.id.clone());

		if self.document {
			out.document = item.document.clone();
		}
		if self.embedding {
			out.embedding = item.embedding.clone();
		}
		if self.scores {
			out.score = item.score;
			out.distance = item.distance;
		}

		out.metadata = self.metadata(item);

		out
	}

	fn metadata(&self, item: &ResultItem) -> Option<Metadata> {
		let metadata = item.metadata.as_ref()?;

		if self.all_metadata {
			return Some(metadata.clone());
		}

		let picked = self
			.fields
			.iter()
			.filter_map(|name| metadata.get_key_value(*name))
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect::<Metadata>();

		if picked.is_empty() { None } else { Some(picked) }
	}
}

/// Projects `items` onto the fields named by `clause`. `id` is always kept.
///
/// An empty selection returns the items unchanged.
pub fn select_fields(items: &[ResultItem], clause: &SelectClause) -> Vec<ResultItem> {
	if clause.keys.is_empty() {
		return items.to_vec();
	}

	let projection = Projection::from_clause(clause);

	items.iter().map(|item| projection.apply(item)).collect()
}
