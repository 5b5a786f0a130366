pub mod interface;
pub mod causal_lm;
pub mod pipeline;
pub mod factory;

pub use interface::ChatModel;
pub use factory::ChatModelFactory;
