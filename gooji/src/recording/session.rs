//! 录制会话状态机
//!
//! 管理单次录制从待命到封存的完整生命周期：
//!
//! ```text
//! Idle ──arm──> Armed ──start──> Recording ──stop──> Stopped
//!                                    ^                  │
//!                                    └──────start───────┘
//! ```
//!
//! 同一会话同时最多只有一次进行中的录制，由状态机保证，不依赖锁。

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use super::artifact::RecordingArtifact;
use super::chunk::ChunkSequence;
use super::error::{RecordingError, RecordingResult};
use super::format::RecordingFormat;

/// 录制会话状态
///
/// 录制控制只在 `Armed` 及之后的状态可用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// 等待设备就绪
    Idle,

    /// 设备就绪，可以开始录制
    Armed,

    /// 正在录制，接收数据块
    Recording,

    /// 录制已停止，产物已封存
    Stopped,
}

impl SessionState {
    /// 检查是否空闲
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// 检查是否待命
    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed)
    }

    /// 检查是否正在录制
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    /// 检查是否已停止
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// 获取状态名称（用于日志和调试）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Armed => "Armed",
            Self::Recording => "Recording",
            Self::Stopped => "Stopped",
        }
    }

    /// 验证状态转换是否合法
    ///
    /// `Stopped -> Recording` 是合法的：开始新录制时隐式重新待命
    pub fn is_valid_transition(from: SessionState, to: SessionState) -> bool {
        use SessionState::*;

        matches!(
            (from, to),
            (Idle, Armed) | (Armed, Recording) | (Recording, Stopped) | (Stopped, Recording)
        )
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

/// 录制会话
///
/// 拥有数据块序列、协商格式和最近一次封存产物的会话对象。
/// 每次采集会话构造一个实例，不存在跨会话共享的可变状态。
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use gooji_lib::media::FakeMediaBackend;
/// use gooji_lib::recording::{RecordingFormat, RecordingSession};
///
/// let backend = FakeMediaBackend::new();
/// let mut session = RecordingSession::new();
///
/// session.arm().unwrap();
/// session.start(RecordingFormat::negotiate(&backend)).unwrap();
/// session.append_chunk(Bytes::from_static(b"chunk")).unwrap();
///
/// let artifact = session.stop().unwrap();
/// assert_eq!(artifact.size_bytes(), 5);
/// ```
#[derive(Debug, Default)]
pub struct RecordingSession {
    /// 当前状态
    state: SessionState,

    /// 本次录制协商的格式（每次 start 解析一次）
    format: Option<RecordingFormat>,

    /// 数据块缓冲区（仅本会话可写入）
    chunks: ChunkSequence,

    /// 最近一次封存的产物
    artifact: Option<Arc<RecordingArtifact>>,
}

impl RecordingSession {
    /// 创建新的录制会话
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取当前状态
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 获取本次录制的协商格式
    pub fn format(&self) -> Option<&RecordingFormat> {
        self.format.as_ref()
    }

    /// 获取最近一次封存的产物
    pub fn artifact(&self) -> Option<Arc<RecordingArtifact>> {
        self.artifact.clone()
    }

    /// 当前缓冲的数据块数量
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// 当前缓冲的总字节数
    pub fn buffered_bytes(&self) -> u64 {
        self.chunks.total_bytes()
    }

    /// 设备就绪，进入待命状态
    ///
    /// # Errors
    ///
    /// 非 `Idle` 状态调用返回 [`RecordingError::InvalidTransition`]
    pub fn arm(&mut self) -> RecordingResult<()> {
        self.transition(SessionState::Armed)?;
        debug!("Recording session armed");
        Ok(())
    }

    /// 开始录制
    ///
    /// 清空之前缓冲的数据块（录制之间不残留），丢弃会话对上一个
    /// 产物的引用（已交给上传任务的产物不受影响），并记录本次
    /// 录制的协商格式。
    ///
    /// # Errors
    ///
    /// 非 `Armed`/`Stopped` 状态调用返回 [`RecordingError::InvalidTransition`]
    pub fn start(&mut self, format: RecordingFormat) -> RecordingResult<()> {
        self.transition(SessionState::Recording)?;

        self.chunks.clear();
        self.artifact = None;
        info!(mime = %format.mime_type, tier = ?format.tier, "Recording started");
        self.format = Some(format);

        Ok(())
    }

    /// 按到达顺序追加一个数据块
    ///
    /// # Errors
    ///
    /// 没有进行中的录制时返回 [`RecordingError::NotRecording`]
    pub fn append_chunk(&mut self, data: Bytes) -> RecordingResult<()> {
        if !self.state.is_recording() {
            return Err(RecordingError::NotRecording);
        }

        if !data.is_empty() {
            self.chunks.push(data);
        }
        Ok(())
    }

    /// 停止录制并封存产物
    ///
    /// 将所有缓冲的数据块按到达顺序拼接为唯一的产物，使用协商的
    /// 容器 MIME 类型标记。提前停止同样封存已有的数据块（取消即
    /// 停止，没有单独的取消状态）。
    ///
    /// # Errors
    ///
    /// 非 `Recording` 状态调用返回 [`RecordingError::InvalidTransition`]
    pub fn stop(&mut self) -> RecordingResult<Arc<RecordingArtifact>> {
        if !self.state.is_recording() {
            return Err(RecordingError::InvalidTransition {
                from: self.state,
                to: SessionState::Stopped,
            });
        }

        let format = self
            .format
            .as_ref()
            .ok_or(RecordingError::FormatNotNegotiated)?;

        let artifact = Arc::new(self.chunks.seal(&format.container()));
        info!(
            size = artifact.size_bytes(),
            chunks = self.chunks.len(),
            mime = artifact.mime_type(),
            "Recording sealed"
        );

        self.artifact = Some(Arc::clone(&artifact));
        self.state = SessionState::Stopped;

        Ok(artifact)
    }

    /// 执行经过验证的状态转换
    fn transition(&mut self, to: SessionState) -> RecordingResult<()> {
        if !SessionState::is_valid_transition(self.state, to) {
            return Err(RecordingError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}
