// Token module - THE STABLE-TOKEN PORT
// Abstract transfer capability plus in-memory and mock implementations

mod memory;
mod mock;
mod traits;

pub use memory::{InMemoryToken, TokenBalances};
pub use mock::{MockTransferPort, RecordedTransfer, TransferDirection};
pub use traits::{TransferError, TransferPort};
