//! 通用类型定义

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 商品 ID
///
/// 由仓储在创建时分配，对外以字符串形式出现。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
#[serde(transparent)]
pub struct ProductId(pub Uuid);

impl ProductId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}
