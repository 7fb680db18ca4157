//! 批量提取流水线集成测试
//!
//! 使用脚本化的 MockClient 驱动编排层，不依赖网络。

use doc_batch_extract::{
    builtin_templates, run_batch, run_session_batch, AppError, AppResult, BatchStatus, Document,
    ExtractionClient, RunInputs, Session, SpreadsheetAdapter, WorkbookAdapter,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// 脚本化的提取客户端
///
/// 按调用顺序弹出预先准备的响应，并记录每次调用的
/// （文档名，请求字段列表）用于断言。
struct MockClient {
    responses: Mutex<Vec<Result<HashMap<String, String>, String>>>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockClient {
    fn new(responses: Vec<Result<HashMap<String, String>, String>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ExtractionClient for MockClient {
    async fn extract(
        &self,
        document: &Document,
        _instructions: &str,
        target_fields: &[String],
    ) -> AppResult<HashMap<String, String>> {
        self.calls
            .lock()
            .unwrap()
            .push((document.file_name.clone(), target_fields.to_vec()));

        let next = self.responses.lock().unwrap().remove(0);
        next.map_err(AppError::Other)
    }
}

fn doc(name: &str) -> Document {
    Document::new(name, "image/png", "data:image/png;base64,AAAA")
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn inputs(documents: Vec<Document>, selected: &[&str], headers: &[&str]) -> RunInputs {
    RunInputs {
        documents,
        instructions: "请提取指定字段。".to_string(),
        selected: strings(selected),
        header_set: strings(headers),
    }
}

/// 行宽不变式：无论选中了几列，每行都包含全部表头的条目
#[tokio::test]
async fn test_row_width_invariant() {
    let client = MockClient::new(vec![Ok(raw(&[("A", "x")]))]);
    let inputs = inputs(vec![doc("1.png")], &["A"], &["A", "B", "C"]);

    let outcome = run_batch(&client, &inputs, |_, _| {}).await;

    assert!(outcome.error.is_none());
    assert_eq!(outcome.rows.len(), 1);
    let row = &outcome.rows[0];
    assert_eq!(row.width(), 3);
    assert_eq!(row.get("A"), "x");
    assert_eq!(row.get("B"), "");
    assert_eq!(row.get("C"), "");
}

/// 顺序保证：第 i 行对应上传顺序第 i 个文档
#[tokio::test]
async fn test_order_preservation() {
    let client = MockClient::new(vec![
        Ok(raw(&[("名称", "第一")])),
        Ok(raw(&[("名称", "第二")])),
        Ok(raw(&[("名称", "第三")])),
    ]);
    let inputs = inputs(
        vec![doc("1.png"), doc("2.png"), doc("3.png")],
        &["名称"],
        &["名称"],
    );

    let outcome = run_batch(&client, &inputs, |_, _| {}).await;

    assert!(outcome.error.is_none());
    let values: Vec<&str> = outcome.rows.iter().map(|r| r.get("名称")).collect();
    assert_eq!(values, vec!["第一", "第二", "第三"]);

    let call_order: Vec<String> = client.calls().into_iter().map(|(name, _)| name).collect();
    assert_eq!(call_order, vec!["1.png", "2.png", "3.png"]);
}

/// 快速失败 + 部分保留：3 个文档中第 2 个失败 →
/// 只有 1 行结果，第 3 个文档从未被尝试
#[tokio::test]
async fn test_fail_stop_preserves_partial_results() {
    let client = MockClient::new(vec![
        Ok(raw(&[("A", "x")])),
        Err("模型超时".to_string()),
        Ok(raw(&[("A", "永远不会用到")])),
    ]);
    let inputs = inputs(
        vec![doc("1.png"), doc("2.png"), doc("3.png")],
        &["A"],
        &["A"],
    );

    let outcome = run_batch(&client, &inputs, |_, _| {}).await;

    assert_eq!(outcome.rows.len(), 1);
    assert_eq!(outcome.rows[0].get("A"), "x");
    assert!(outcome.error.as_deref().unwrap().contains("模型超时"));

    // 第 3 个文档没有被调用
    assert_eq!(client.calls().len(), 2);
}

/// 字段范围：请求列表必须恰好是选中列，绝不是完整表头
#[tokio::test]
async fn test_field_scoping_sends_only_selected_columns() {
    let client = MockClient::new(vec![Ok(raw(&[("A", "1"), ("C", "3")]))]);
    let inputs = inputs(vec![doc("1.png")], &["A", "C"], &["A", "B", "C"]);

    let outcome = run_batch(&client, &inputs, |_, _| {}).await;
    assert!(outcome.error.is_none());

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, strings(&["A", "C"]));
}

/// 增量进度：每完成一个文档发布一次，行数 == 已完成请求数
#[tokio::test]
async fn test_incremental_progress() {
    let client = MockClient::new(vec![
        Ok(raw(&[("A", "1")])),
        Ok(raw(&[("A", "2")])),
        Ok(raw(&[("A", "3")])),
    ]);
    let inputs = inputs(
        vec![doc("1.png"), doc("2.png"), doc("3.png")],
        &["A"],
        &["A"],
    );

    let mut observed = Vec::new();
    let outcome = run_batch(&client, &inputs, |rows, total| {
        observed.push((rows.len(), total));
    })
    .await;

    assert!(outcome.error.is_none());
    assert_eq!(observed, vec![(1, 3), (2, 3), (3, 3)]);
}

/// 会话级整体流程：upload → run → 状态机落在 success，
/// 结果行写回会话
#[tokio::test]
async fn test_run_session_batch_success() {
    let dir = std::env::temp_dir().join(format!("doc_batch_extract_it_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let template = dir.join("模板.csv");
    std::fs::write(&template, "品名,单价\n旧货,9.9\n").unwrap();

    let adapter = WorkbookAdapter::new();
    let mut session = Session::new(builtin_templates());
    session.add_documents(vec![doc("a.png"), doc("b.png")]);
    session.upload_spreadsheet(&adapter, &template).unwrap();

    let client = MockClient::new(vec![
        Ok(raw(&[("品名", "苹果"), ("单价", "3.5")])),
        Ok(raw(&[("品名", "香蕉")])),
    ]);

    let status = run_session_batch(&mut session, &client, |_, _| {})
        .await
        .unwrap();

    assert_eq!(status, BatchStatus::Success);
    assert_eq!(session.batch().rows.len(), 2);
    assert_eq!(session.batch().rows[1].get("品名"), "香蕉");
    assert_eq!(session.batch().rows[1].get("单价"), "");

    // 合并导出：原有行在前，新行按产出顺序在后
    let export_path = adapter
        .merge_and_export(&template, session.header_set(), &session.batch().rows)
        .unwrap();
    let exported = adapter.read_rows(&export_path).unwrap();
    assert_eq!(exported.len(), 3);
    assert_eq!(exported[0].get("品名"), "旧货");
    assert_eq!(exported[1].get("品名"), "苹果");
    assert_eq!(exported[2].get("品名"), "香蕉");

    std::fs::remove_dir_all(&dir).unwrap();
}

/// 会话级失败流程：状态落在 error，部分结果保留，
/// 显式重新启动后允许再次运行
#[tokio::test]
async fn test_run_session_batch_error_then_restart() {
    let dir = std::env::temp_dir().join(format!("doc_batch_extract_err_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let template = dir.join("模板.csv");
    std::fs::write(&template, "品名\n").unwrap();

    let adapter = WorkbookAdapter::new();
    let mut session = Session::new(builtin_templates());
    session.add_documents(vec![doc("a.png"), doc("b.png")]);
    session.upload_spreadsheet(&adapter, &template).unwrap();

    let client = MockClient::new(vec![
        Ok(raw(&[("品名", "苹果")])),
        Err("网络错误".to_string()),
    ]);

    let status = run_session_batch(&mut session, &client, |_, _| {})
        .await
        .unwrap();

    assert_eq!(status, BatchStatus::Error);
    assert_eq!(session.batch().rows.len(), 1);
    assert!(session.batch().error.as_deref().unwrap().contains("网络错误"));

    // 失败后由用户显式重新启动：从头开始，不从失败文档续跑
    let retry_client = MockClient::new(vec![
        Ok(raw(&[("品名", "苹果")])),
        Ok(raw(&[("品名", "香蕉")])),
    ]);
    let status = run_session_batch(&mut session, &retry_client, |_, _| {})
        .await
        .unwrap();

    assert_eq!(status, BatchStatus::Success);
    assert_eq!(session.batch().rows.len(), 2);
    assert_eq!(retry_client.calls().len(), 2);

    std::fs::remove_dir_all(&dir).unwrap();
}
