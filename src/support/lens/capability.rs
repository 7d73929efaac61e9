mod thick;
mod thin;

pub use thick::ThickLens;
pub use thin::ThinLens;
