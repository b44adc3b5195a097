//! 采集流程测试
//!
//! 用内存后端驱动完整的录制流程：设备协商、开始/停止录制、封存产物
//!
//! 运行: cargo run --example test_capture

use std::sync::Arc;

use bytes::Bytes;
use gooji_lib::media::FakeMediaBackend;
use gooji_lib::recording::Recorder;
use gooji_lib::state::{CaptureConfig, StateManager};
use gooji_lib::utils::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    println!("=== 采集流程测试 ===\n");

    // 1. 设备协商
    println!("1. 设备协商");
    println!("{}", "-".repeat(40));

    let backend = Arc::new(FakeMediaBackend::new());
    let state = Arc::new(StateManager::new());
    let mut recorder = Recorder::new(
        backend.clone(),
        Arc::clone(&state),
        CaptureConfig::default(),
    );

    let inventory = recorder.enumerate_devices().await?;
    println!("  视频设备: {}", inventory.video.len());
    println!("  音频设备: {}", inventory.audio.len());

    let permission = recorder.permission_status().await;
    println!("  权限: {:?}", permission.combined());

    recorder.initialize().await?;
    println!("  状态: {}", state.current().name());
    println!();

    // 2. 录制三个数据块
    println!("2. 录制");
    println!("{}", "-".repeat(40));

    recorder.start().await?;
    println!("  状态: {}", state.current().name());

    let encoder = backend.active_encoders()[0];
    for size in [1024usize, 2048, 512] {
        backend.emit_chunk(encoder, Bytes::from(vec![0u8; size])).await;
        println!("  数据块: {size} 字节");
    }

    // 3. 封存
    println!("\n3. 封存");
    println!("{}", "-".repeat(40));

    let artifact = recorder.stop().await?;
    println!("  产物大小: {} 字节", artifact.size_bytes());
    println!("  MIME 类型: {}", artifact.mime_type());
    println!("  状态: {}", state.current().name());

    recorder.shutdown().await;
    println!("\n=== 完成 ===");
    Ok(())
}
