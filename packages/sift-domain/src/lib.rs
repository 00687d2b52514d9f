pub mod clause;
pub mod collate;
pub mod field;
pub mod group_by;
pub mod item;
pub mod rrf;
pub mod select;
pub mod transform;

pub use clause::{
	Aggregate, FusionClause, GroupByClause, KeyRef, KeyRefs, KnnQuery, LimitClause, QueryContent,
	RankSpec, SelectClause, TopK,
};
pub use field::{FieldRef, FieldValue};
pub use group_by::{ResultGroup, group_results};
pub use item::{Metadata, MetadataValue, ResultItem};
pub use rrf::{DEFAULT_RRF_K, FusionOptions, fuse};
pub use select::select_fields;
pub use transform::{RawQueryResponse, transform_query_results};
