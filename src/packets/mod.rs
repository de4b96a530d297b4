//! Per-family descriptor tables and post-processing. Each submodule owns
//! the type ids of one radio technology and registers its versions with
//! [`register_all`].

use crate::error::RegistryError;
use crate::registry::RegistryBuilder;

pub mod gsm;
pub mod lte_ml1;
pub mod lte_nas;
pub mod lte_phy;
pub mod lte_rrc;
pub mod nr_rrc;
pub mod wcdma;

/// The one-byte version most families lead with.
const PKT_VERSION: &str = "Pkt Version";

pub fn register_all(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    gsm::register(builder)?;
    wcdma::register(builder)?;
    lte_rrc::register(builder)?;
    lte_nas::register(builder)?;
    lte_ml1::register(builder)?;
    lte_phy::register(builder)?;
    nr_rrc::register(builder)?;
    Ok(())
}
