pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("edge references unknown node `{node}`")]
    UnknownNode { node: String },

    #[error("node `{child}` is nested under unknown node `{parent}`")]
    UnknownParent { child: String, parent: String },

    #[error("nesting cycle through node `{node}`")]
    ParentCycle { node: String },

    #[error("node `{node}` has invalid size {width}x{height}")]
    InvalidSize {
        node: String,
        width: f64,
        height: f64,
    },
}
