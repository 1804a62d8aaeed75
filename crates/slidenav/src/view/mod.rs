//! Read-only projections of navigator state.

pub mod chrome;
pub mod grid;
pub mod toc;

pub use chrome::Chrome;
pub use grid::GridOverview;
pub use toc::TableOfContents;
