//! IONOS Cloud Object Storage management
//!
//! Access keys (managed) and regions (read-only), served from the global
//! management endpoint `https://s3.ionos.com`.

pub mod access_key;
pub mod api;
pub mod model;
pub mod region;

pub use access_key::{
    AccessKeyDataSource, AccessKeyFilter, AccessKeyResource, AccessKeySpec, AccessKeyState,
};
pub use api::{AccessKeysApi, ENDPOINT, HttpAccessKeysApi, HttpRegionsApi, PRODUCT, RegionsApi};
pub use model::{AccessKey, Region, RegionCapability, RegionProperties};
pub use region::RegionDataSource;
