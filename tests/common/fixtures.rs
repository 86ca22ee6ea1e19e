//! JSON bodies as the dashboard service sends them

use serde_json::{Value, json};

/// Celery-style task identifier
pub const TASK_ID: &str = "9b3f1c2e-5d4a-4e7b-8c6f-1a2b3c4d5e6f";

/// Accepted submission
pub fn submitted(task_id: &str) -> Value {
    json!({
        "success": true,
        "task_id": task_id,
        "message": "详细报告生成任务已提交，正在处理中（基于CSV数据）"
    })
}

/// Status body for a task still in progress
pub fn in_progress(task_id: &str, status: &str) -> Value {
    json!({
        "success": true,
        "task_id": task_id,
        "status": status,
        "message": "任务正在执行中"
    })
}

/// Status body for a finished task
pub fn finished(task_id: &str, result: Value) -> Value {
    json!({
        "success": true,
        "task_id": task_id,
        "status": "success",
        "message": "任务执行成功",
        "result": result
    })
}

/// Status body for a failed task
pub fn failed(task_id: &str, reason: &str) -> Value {
    json!({
        "success": false,
        "task_id": task_id,
        "status": "failure",
        "message": format!("任务执行失败: {}", reason)
    })
}

/// Complete detailed report payload
pub fn report() -> Value {
    json!({
        "model_info": {
            "brand": "Kia",
            "model": "EV6",
            "range": 310,
            "price": 42600,
            "market_share": 22.75,
            "popular_region": "WA",
            "year": 2023,
            "ev_type": "Battery Electric Vehicle (BEV)"
        },
        "sales_trend": {
            "years": [2019, 2020, 2021, 2022, 2023],
            "sales": [10500, 17200, 26800, 38100, 49900]
        },
        "competitor_analysis": [
            {"brand": "Ford", "model": "Mustang Mach-E", "price": 44730.0, "range": 282.1},
            {"brand": "Chevrolet", "model": "Bolt EUV", "price": 36210.0, "range": 251.3},
            {"brand": "Hyundai", "model": "Ioniq 5", "price": 42170.0, "range": 297.6}
        ],
        "market_forecast": {
            "next_year_prediction": "预计销量增长17%",
            "factors": ["政策补贴延续", "充电网络扩展", "电池技术进步", "消费者环保意识提升"]
        },
        "generated_at": "2024-06-11 16:02:37",
        "data_coverage": "基于57条原始数据记录生成"
    })
}
