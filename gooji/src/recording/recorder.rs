//! 采集流程编排模块
//!
//! 整合设备协商、录制会话和状态机，提供端到端的录制流程
//!
//! # 工作流程
//!
//! ```text
//! 1. initialize()
//!    └── 带重试的设备协商，绑定预览
//!    └── State: Idle -> Acquiring -> Ready | Error
//!
//! 2. start()
//!    └── 解析录制格式（每次开始解析一次）
//!    └── 启动编码器，派生数据块接收任务
//!    └── State: Ready -> Recording
//!
//! 3. 数据块按到达顺序进入会话缓冲区
//!    └── Event: ChunkCaptured
//!
//! 4. stop()
//!    └── 停止编码器（先冲刷后关闭），封存产物
//!    └── State: Recording -> Sealed
//!    └── Event: RecordingSealed
//! ```
//!
//! 重试预算耗尽后进入终态错误，录制控制保持禁用，不再自动重试。

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::artifact::RecordingArtifact;
use super::error::{RecordingError, RecordingResult};
use super::format::RecordingFormat;
use super::session::{RecordingSession, SessionState};
use crate::device::acquire::{AcquireStatus, DeviceAcquirer, DeviceInventory};
use crate::device::error::DeviceResult;
use crate::device::permission::PermissionStatus;
use crate::media::{EncoderId, MediaBackend};
use crate::state::config::CaptureConfig;
use crate::state::{AppState, StateManager};

/// 采集事件
///
/// 发送给宿主界面的采集流程通知
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum CaptureEvent {
    /// 设备就绪，录制控制可用
    DeviceReady,
    /// 设备协商失败（重试预算已耗尽）
    DeviceFailed { message: String },
    /// 录制已开始
    RecordingStarted { mime_type: String },
    /// 收到一个数据块
    ChunkCaptured {
        size: usize,
        total_bytes: u64,
        chunks: usize,
    },
    /// 录制已停止，产物已封存
    RecordingSealed { size_bytes: u64, mime_type: String },
}

/// 采集流程编排器
///
/// 每个采集会话构造一个实例；设备句柄、会话缓冲区和编码器
/// 都由它独占管理，不存在模块级可变状态。
///
/// # 使用示例
///
/// ```
/// use std::sync::Arc;
/// use gooji_lib::media::FakeMediaBackend;
/// use gooji_lib::recording::Recorder;
/// use gooji_lib::state::{CaptureConfig, StateManager};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let backend = Arc::new(FakeMediaBackend::new());
/// let state = Arc::new(StateManager::new());
/// let mut recorder = Recorder::new(backend, state, CaptureConfig::default());
///
/// recorder.initialize().await.unwrap();
/// recorder.start().await.unwrap();
/// let artifact = recorder.stop().await.unwrap();
/// assert_eq!(artifact.mime_type(), "video/webm");
/// # }
/// ```
pub struct Recorder {
    /// 媒体能力后端
    backend: Arc<dyn MediaBackend>,
    /// 设备协商器（独占持有当前流句柄）
    acquirer: DeviceAcquirer,
    /// 录制会话
    session: Arc<tokio::sync::Mutex<RecordingSession>>,
    /// 应用状态管理器
    state: Arc<StateManager>,
    /// 采集配置
    config: CaptureConfig,
    /// 运行中的编码器
    encoder: Option<EncoderId>,
    /// 数据块接收任务
    drain_task: Option<JoinHandle<()>>,
    /// 采集事件监听器列表
    listeners: Arc<tokio::sync::Mutex<Vec<mpsc::Sender<CaptureEvent>>>>,
}

impl Recorder {
    /// 创建采集流程编排器
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        state: Arc<StateManager>,
        config: CaptureConfig,
    ) -> Self {
        let acquirer = DeviceAcquirer::new(Arc::clone(&backend));
        Self {
            backend,
            acquirer,
            session: Arc::new(tokio::sync::Mutex::new(RecordingSession::new())),
            state,
            config,
            encoder: None,
            drain_task: None,
            listeners: Arc::new(tokio::sync::Mutex::new(Vec::new())),
        }
    }

    /// 添加采集事件监听器
    pub async fn subscribe(&self) -> mpsc::Receiver<CaptureEvent> {
        let (tx, rx) = mpsc::channel(32);
        self.listeners.lock().await.push(tx);
        rx
    }

    /// 协商设备并武装录制会话
    ///
    /// 按配置的重试策略自动重试；预算耗尽后进入终态错误，
    /// 录制保持禁用，需要用户显式重试
    ///
    /// # Errors
    ///
    /// 重试预算耗尽后返回最后一次的设备错误
    pub async fn initialize(&mut self) -> RecordingResult<()> {
        info!("Initializing capture flow");
        self.set_state(AppState::acquiring());

        let constraints = self.config.constraints();
        let policy = self.config.retry_policy();

        match self.acquirer.acquire_with_retry(&constraints, &policy).await {
            Ok(_) => {
                self.session.lock().await.arm()?;
                self.set_state(AppState::ready());
                self.emit(CaptureEvent::DeviceReady).await;
                info!("Capture flow ready");
                Ok(())
            }
            Err(err) => {
                self.set_state(AppState::error(err.to_string()));
                self.emit(CaptureEvent::DeviceFailed {
                    message: err.to_string(),
                })
                .await;
                Err(RecordingError::Device(err))
            }
        }
    }

    /// 开始录制
    ///
    /// 每次开始时解析一次录制格式（而不是每个数据块），
    /// 启动编码器并派生数据块接收任务
    ///
    /// # Errors
    ///
    /// - [`RecordingError::NoActiveStream`] - 没有就绪的设备
    /// - [`RecordingError::InvalidTransition`] - 已有进行中的录制
    /// - [`RecordingError::Device`] - 编码器启动失败
    pub async fn start(&mut self) -> RecordingResult<()> {
        if self.encoder.is_some() {
            return Err(RecordingError::InvalidTransition {
                from: SessionState::Recording,
                to: SessionState::Recording,
            });
        }

        let stream = *self
            .acquirer
            .current_stream()
            .ok_or(RecordingError::NoActiveStream)?;

        {
            let session = self.session.lock().await;
            let current = session.state();
            if !(current.is_armed() || current.is_stopped()) {
                return Err(RecordingError::InvalidTransition {
                    from: current,
                    to: SessionState::Recording,
                });
            }
        }

        // 格式协商在会话开始时解析一次
        let format = RecordingFormat::negotiate(self.backend.as_ref());

        let (tx, mut rx) = mpsc::channel::<Bytes>(64);
        let encoder = self.backend.start_encoder(&stream, &format, tx).await?;
        self.encoder = Some(encoder);

        self.session.lock().await.start(format.clone())?;
        self.set_state(AppState::recording());
        self.emit(CaptureEvent::RecordingStarted {
            mime_type: format.mime_type.clone(),
        })
        .await;

        let session = Arc::clone(&self.session);
        let listeners = Arc::clone(&self.listeners);
        let drain = tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                let size = chunk.len();

                let (total_bytes, chunks) = {
                    let mut guard = session.lock().await;
                    if let Err(err) = guard.append_chunk(chunk) {
                        warn!(error = %err, "Dropping chunk outside active recording");
                        continue;
                    }
                    (guard.buffered_bytes(), guard.chunk_count())
                };

                Self::notify(
                    &listeners,
                    CaptureEvent::ChunkCaptured {
                        size,
                        total_bytes,
                        chunks,
                    },
                )
                .await;
            }
            debug!("Chunk drain finished");
        });
        self.drain_task = Some(drain);

        Ok(())
    }

    /// 停止录制并封存产物
    ///
    /// 依赖编码器的先冲刷后关闭语义：停止请求之前发出的所有
    /// 数据块都会先进入会话缓冲区，然后才封存。提前停止同样
    /// 封存已有的数据块（取消即停止）
    ///
    /// # Errors
    ///
    /// 没有进行中的录制时返回 [`RecordingError::NotRecording`]
    pub async fn stop(&mut self) -> RecordingResult<Arc<RecordingArtifact>> {
        let encoder = self.encoder.take().ok_or(RecordingError::NotRecording)?;

        self.backend.stop_encoder(encoder).await;

        // 等待接收任务排空通道里剩余的数据块
        if let Some(task) = self.drain_task.take() {
            let _ = task.await;
        }

        let artifact = self.session.lock().await.stop()?;
        self.set_state(AppState::sealed());
        self.emit(CaptureEvent::RecordingSealed {
            size_bytes: artifact.size_bytes(),
            mime_type: artifact.mime_type().to_string(),
        })
        .await;

        Ok(artifact)
    }

    /// 释放所有资源
    ///
    /// 停止进行中的录制（不封存）、释放设备流并复位状态
    pub async fn shutdown(&mut self) {
        info!("Shutting down capture flow");

        if let Some(encoder) = self.encoder.take() {
            self.backend.stop_encoder(encoder).await;
        }
        if let Some(task) = self.drain_task.take() {
            let _ = task.await;
        }

        self.acquirer.release().await;
        self.state.reset();
    }

    /// 是否有进行中的录制
    pub fn is_recording(&self) -> bool {
        self.encoder.is_some()
    }

    /// 设备协商状态
    pub fn acquire_status(&self) -> &AcquireStatus {
        self.acquirer.status()
    }

    /// 枚举可用采集设备
    ///
    /// # Errors
    ///
    /// 仅当枚举本身失败时返回设备错误；空清单是合法结果
    pub async fn enumerate_devices(&mut self) -> DeviceResult<DeviceInventory> {
        self.acquirer.enumerate().await
    }

    /// 查询摄像头/麦克风权限状态
    pub async fn permission_status(&self) -> PermissionStatus {
        self.acquirer.permission_status().await
    }

    /// 获取录制会话状态
    pub async fn session_state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// 获取最近一次封存的产物
    pub async fn artifact(&self) -> Option<Arc<RecordingArtifact>> {
        self.session.lock().await.artifact()
    }

    /// 执行应用状态转换，拒绝时记录日志
    fn set_state(&self, new_state: AppState) {
        if let Err(err) = self.state.transition(new_state) {
            warn!(error = %err, "App state transition rejected");
        }
    }

    /// 发射采集事件
    async fn emit(&self, event: CaptureEvent) {
        Self::notify(&self.listeners, event).await;
    }

    /// 通知所有监听者
    async fn notify(
        listeners: &Arc<tokio::sync::Mutex<Vec<mpsc::Sender<CaptureEvent>>>>,
        event: CaptureEvent,
    ) {
        let guard = listeners.lock().await;
        for listener in guard.iter() {
            // 使用 try_send 避免阻塞采集路径
            let _ = listener.try_send(event.clone());
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        // 无法在 Drop 中等待异步停止，尽量中止接收任务
        if let Some(task) = self.drain_task.take() {
            task.abort();
        }
    }
}
