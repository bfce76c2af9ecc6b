pub mod grouper;
pub mod rebalancer;
pub mod resolver;
pub mod rng;
pub mod types;

pub use grouper::CountryGrouper;
pub use rebalancer::{RebalanceStep, SizeRebalancer};
pub use resolver::IndexResolver;
pub use rng::random_source;
pub use types::{
    CountryAssignment, SplitGroup, SplitGroups, SplitIndexSet, SplitIndices, SplitRatios,
    SplitTargets,
};
