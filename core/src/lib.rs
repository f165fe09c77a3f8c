pub use combat::*;
pub use error::*;
pub use grid::*;
pub use input::*;
pub use minefield::*;
pub use serpent::*;
pub use session::*;
pub use shooter::*;
pub use tetromino::*;
pub use types::*;

mod combat;
mod error;
mod grid;
mod input;
mod minefield;
mod serpent;
mod session;
mod shooter;
mod tetromino;
mod types;
