//! 上传校验测试
//!
//! 演示提交前的本地校验和进度跟踪（不需要后端）
//!
//! 运行: cargo run --example test_upload

use bytes::Bytes;
use gooji_lib::upload::{
    ProgressTracker, UploadClient, UploadJob, UploadMetadata, UploadPayload,
};
use gooji_lib::utils::logging::init_logging;

fn main() {
    init_logging();

    println!("=== 上传校验测试 ===\n");

    let client = UploadClient::new("http://localhost:8080");

    // 1. 合法任务
    println!("1. 合法任务");
    println!("{}", "-".repeat(40));

    let payload = UploadPayload::File {
        name: "clip.webm".to_string(),
        mime_type: "video/webm".to_string(),
        data: Bytes::from(vec![0u8; 4096]),
    };
    let metadata = UploadMetadata::new("测试标题", "测试描述", "story")
        .with_tags("story, legend  tale");
    let job = UploadJob::new(payload, metadata);

    match client.validate(&job) {
        Ok(()) => println!("  OK 校验通过"),
        Err(e) => println!("  !! {e}"),
    }
    println!("  规范化标签: {}", job.metadata().tags_field());
    println!();

    // 2. 非法任务
    println!("2. 非法任务");
    println!("{}", "-".repeat(40));

    let cases = vec![
        ("空标题", "", "video/webm", 1024usize),
        ("不支持的类型", "标题", "text/plain", 1024),
        ("空负载", "标题", "video/webm", 0),
    ];

    for (label, title, mime, size) in cases {
        let job = UploadJob::new(
            UploadPayload::File {
                name: "f".to_string(),
                mime_type: mime.to_string(),
                data: Bytes::from(vec![0u8; size]),
            },
            UploadMetadata::new(title, "描述", "story"),
        );
        match client.validate(&job) {
            Ok(()) => println!("  ?? {label}: 意外通过"),
            Err(e) => println!("  OK {label}: {e}"),
        }
    }
    println!();

    // 3. 进度跟踪
    println!("3. 进度跟踪");
    println!("{}", "-".repeat(40));

    let mut tracker = ProgressTracker::new(3 * 64 * 1024);
    for _ in 0..3 {
        tracker.advance(64 * 1024);
        println!(
            "  已传输 {} 字节, 比例 {:.4}, 显示 {}%",
            tracker.transferred(),
            tracker.ratio(),
            tracker.display_percent()
        );
    }

    println!("\n=== 完成 ===");
}
