/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use thiserror::Error;

/// Every store-call failure is translated into one of these at the call
/// site; none escape as uncaught faults.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum AppError {
    /// Network or server failure. Passive polling swallows it and retries
    /// on the next tick; user-initiated actions surface it as a dismissible
    /// message.
    #[error("Store Unreachable : {0}")]
    TransportError(String),

    /// Expected contention: another actor already holds the claim. Not
    /// retried automatically.
    #[error("Already Claimed By : {holder}")]
    AlreadyClaimed { holder: String },

    /// Dedup record could not be written. The session degrades to
    /// in-memory-only tracking.
    #[error("Seen Store Persistence Failed : {0}")]
    PersistenceError(String),

    /// A transfer decision arrived after another actor resolved it.
    #[error("Transfer Already Resolved")]
    StaleDecision,

    #[error("Invalid Request : {0}")]
    InvalidRequest(String),

    #[error("Internal Error : {0}")]
    InternalError(String),
}
