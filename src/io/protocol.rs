//! JSON messages exchanged with the worker
//!
//! Every message carries a `kind` tag and camelCase field names:
//! - `compute`: cell and tile descriptors plus the duplicate policy
//! - `progress`: fraction of the run completed
//! - `done`: one tile index per cell
//! - `failed`: description of an internal fault

use crate::algorithm::executor::{ComputeRequest, WorkerEvent};
use crate::algorithm::solver::DuplicatePolicy;
use crate::analysis::descriptor::Descriptor;
use crate::io::error::{MosaicError, Result, invalid_input};
use serde::{Deserialize, Serialize};

/// Duplicate policy as it appears on the wire
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyMessage {
    /// Whether a tile may fill several cells
    pub allow_duplicates: bool,
    /// Usage cap per tile; absent means uncapped when duplicates are allowed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uses_per_tile: Option<i64>,
}

impl TryFrom<PolicyMessage> for DuplicatePolicy {
    type Error = MosaicError;

    fn try_from(message: PolicyMessage) -> Result<Self> {
        if !message.allow_duplicates {
            return Ok(Self::NoDuplicates);
        }
        match message.max_uses_per_tile {
            None => Ok(Self::uncapped()),
            Some(cap) if cap <= 0 => Err(invalid_input(&format!(
                "max uses per tile must be positive, got {cap}"
            ))),
            Some(cap) => Ok(Self::capped(usize::try_from(cap).unwrap_or(usize::MAX))),
        }
    }
}

impl From<DuplicatePolicy> for PolicyMessage {
    fn from(policy: DuplicatePolicy) -> Self {
        match policy {
            DuplicatePolicy::NoDuplicates => Self::default(),
            DuplicatePolicy::DuplicatesAllowed { max_uses_per_tile } => Self {
                allow_duplicates: true,
                max_uses_per_tile: (max_uses_per_tile != usize::MAX)
                    .then(|| i64::try_from(max_uses_per_tile).unwrap_or(i64::MAX)),
            },
        }
    }
}

/// One protocol message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Message {
    /// Request to compute an assignment
    Compute {
        /// Descriptor vectors of the grid cells in row-major order
        cell_descriptors: Vec<Vec<f64>>,
        /// Descriptor vectors of the tiles
        tile_descriptors: Vec<Vec<f64>>,
        /// Whether and how often tiles may repeat
        duplicate_policy: PolicyMessage,
    },
    /// Progress update
    Progress {
        /// Completed fraction in `[0, 1]`
        fraction: f64,
    },
    /// Final assignment
    Done {
        /// Tile index per cell
        assignment: Vec<usize>,
    },
    /// Internal fault during a run
    Failed {
        /// Description of the fault
        reason: String,
    },
}

impl Message {
    /// Encode a compute request
    pub fn compute(request: &ComputeRequest) -> Self {
        let raw = |descriptors: &[Descriptor]| -> Vec<Vec<f64>> {
            descriptors.iter().map(|d| d.values().to_vec()).collect()
        };
        Self::Compute {
            cell_descriptors: raw(&request.cell_descriptors),
            tile_descriptors: raw(&request.tile_descriptors),
            duplicate_policy: request.policy.into(),
        }
    }

    /// Decode a compute message into a validated request
    ///
    /// Descriptor kinds are inferred from vector length.
    ///
    /// # Errors
    ///
    /// Returns an error if the message is not a compute request, a descriptor has an
    /// unknown length, or the request fails validation
    pub fn into_request(self) -> Result<ComputeRequest> {
        let Self::Compute {
            cell_descriptors,
            tile_descriptors,
            duplicate_policy,
        } = self
        else {
            return Err(invalid_input(&"only compute messages describe a request"));
        };

        let parse = |raw: Vec<Vec<f64>>| -> Result<Vec<Descriptor>> {
            raw.into_iter().map(Descriptor::from_values).collect()
        };
        let request = ComputeRequest::new(
            parse(cell_descriptors)?,
            parse(tile_descriptors)?,
            duplicate_policy.try_into()?,
        );
        request.validate()?;
        Ok(request)
    }

    /// Parse a message from JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid message
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render the message as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<&WorkerEvent> for Message {
    fn from(event: &WorkerEvent) -> Self {
        match event {
            WorkerEvent::Progress { fraction, .. } => Self::Progress {
                fraction: *fraction,
            },
            WorkerEvent::Done { assignment, .. } => Self::Done {
                assignment: assignment.tiles().to_vec(),
            },
            WorkerEvent::Failed { reason, .. } => Self::Failed {
                reason: reason.clone(),
            },
        }
    }
}
