use async_trait::async_trait;
use crate::utils::validation::Validate;
use serde::{de::DeserializeOwned, Serialize};

/// agent 可呼叫的搜尋工具。
///
/// `execute` 沒有錯誤通道：供應商失敗或資料形狀問題一律降級為較少（或零筆）結果，
/// 細節只寫進日誌。唯一會被拒絕的是輸入本身，輸入在反序列化與 `Validate` 階段就被檢查，早於任何對外請求。
#[async_trait]
pub trait SearchTool: Send + Sync {
    type Input: DeserializeOwned + Validate + Send;
    type Output: Serialize + Send;

    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;

    async fn execute(&self, input: Self::Input) -> Self::Output;
}
