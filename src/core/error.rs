use thiserror::Error;

/// Error taxonomy of the simulation kernel.
///
/// Precondition failures are part of normal play: the turn loop swallows them
/// for planner-driven actors and forwards their display strings to the player
/// message queue. Everything else signals a programming or persistence
/// problem. The display strings of precondition variants are the exact
/// player-facing phrasings.
#[derive(Error, Debug)]
pub enum GulchError {
    // --- Validation (programmer error) ---
    #[error("position out of bounds: ({0}, {1})")]
    OutOfBounds(i32, i32),

    #[error("creature not found: {0}")]
    CreatureNotFound(String),

    #[error("content entry not found: {0}")]
    MissingContent(String),

    // --- Preconditions (recovered locally) ---
    #[error("the way is blocked")]
    Blocked,

    #[error("the door is locked")]
    Locked,

    #[error("there is no door there")]
    NoDoor,

    #[error("the door stands open")]
    DoorOpen,

    #[error("the key does not fit")]
    KeyMismatch,

    #[error("out of ammo")]
    NoAmmo,

    #[error("no weapon for that")]
    NoWeapon,

    #[error("out of range")]
    OutOfRange,

    #[error("nothing there")]
    NothingThere,

    #[error("too heavy to carry")]
    TooHeavy,

    #[error("that item is no use for this")]
    WrongItemKind,

    #[error("item not found")]
    ItemNotFound,

    #[error("no mount")]
    NotMounted,

    #[error("the mount has already moved")]
    MountSpent,

    #[error("cannot do that while mounted")]
    Mounted,

    // --- Persistence ---
    #[error("malformed save: {0}")]
    MalformedSave(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("content parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl GulchError {
    /// Precondition failures are expected during play and never abort a tick.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            GulchError::Blocked
                | GulchError::Locked
                | GulchError::NoDoor
                | GulchError::DoorOpen
                | GulchError::KeyMismatch
                | GulchError::NoAmmo
                | GulchError::NoWeapon
                | GulchError::OutOfRange
                | GulchError::NothingThere
                | GulchError::TooHeavy
                | GulchError::WrongItemKind
                | GulchError::ItemNotFound
                | GulchError::NotMounted
                | GulchError::MountSpent
                | GulchError::Mounted
        )
    }
}

pub type Result<T> = std::result::Result<T, GulchError>;
