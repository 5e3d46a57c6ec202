pub mod config {
    pub use serpentine_core::config::*;
}
pub mod creature {
    pub use serpentine_core::creature::*;
}
pub mod decision {
    pub use serpentine_core::decision::*;
}
pub mod effects {
    pub use serpentine_core::effects::*;
}
pub mod interaction {
    pub use serpentine_core::interaction::*;
}
pub mod lifecycle {
    pub use serpentine_core::lifecycle::*;
}
pub mod metrics {
    pub use serpentine_core::metrics::*;
}
pub mod movement {
    pub use serpentine_core::movement::*;
}
pub mod snapshot {
    pub use serpentine_core::snapshot::*;
}
pub mod spatial_hash {
    pub use serpentine_core::spatial_hash::*;
}
pub mod state {
    pub use serpentine_core::state::*;
}

pub mod session;
pub mod world;
