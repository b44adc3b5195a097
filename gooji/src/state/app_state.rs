use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use tokio::sync::mpsc;

use super::error::{StateError, StateResult};

/// 应用主状态
///
/// 表示采集上传流程的整体状态：设备就绪后才能录制，录制封存后
/// 才能上传
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AppState {
    /// 空闲状态，尚未请求设备
    Idle,

    /// 正在协商摄像头/麦克风
    Acquiring,

    /// 设备就绪，录制控制可用
    Ready,

    /// 正在录制
    Recording,

    /// 产物已封存，可以回放或上传
    Sealed,

    /// 正在上传
    Uploading,

    /// 错误状态
    Error(String),
}

impl AppState {
    /// 创建空闲状态
    pub fn idle() -> Self {
        Self::Idle
    }

    /// 创建设备协商状态
    pub fn acquiring() -> Self {
        Self::Acquiring
    }

    /// 创建就绪状态
    pub fn ready() -> Self {
        Self::Ready
    }

    /// 创建录制状态
    pub fn recording() -> Self {
        Self::Recording
    }

    /// 创建已封存状态
    pub fn sealed() -> Self {
        Self::Sealed
    }

    /// 创建上传状态
    pub fn uploading() -> Self {
        Self::Uploading
    }

    /// 创建错误状态
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// 检查是否为空闲状态
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// 检查是否在协商设备
    pub fn is_acquiring(&self) -> bool {
        matches!(self, Self::Acquiring)
    }

    /// 检查是否就绪
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// 检查是否在录制中
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    /// 检查是否已封存
    pub fn is_sealed(&self) -> bool {
        matches!(self, Self::Sealed)
    }

    /// 检查是否在上传中
    pub fn is_uploading(&self) -> bool {
        matches!(self, Self::Uploading)
    }

    /// 检查是否为错误状态
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// 获取错误消息（如果处于错误状态）
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// 获取状态名称（用于日志和调试）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Acquiring => "Acquiring",
            Self::Ready => "Ready",
            Self::Recording => "Recording",
            Self::Sealed => "Sealed",
            Self::Uploading => "Uploading",
            Self::Error(_) => "Error",
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::Idle
    }
}

/// 状态变更事件载荷
///
/// 发送给宿主界面的状态快照
#[derive(Debug, Clone, Serialize)]
pub struct StateChangeEvent {
    /// 状态名称
    pub state: String,
    /// 录制控制是否可用
    pub recording_enabled: bool,
    /// 上传控制是否可用
    pub upload_enabled: bool,
    /// 错误消息（如果有）
    pub error_message: Option<String>,
}

impl From<&AppState> for StateChangeEvent {
    fn from(state: &AppState) -> Self {
        Self {
            state: state.name().to_string(),
            recording_enabled: matches!(
                state,
                AppState::Ready | AppState::Recording | AppState::Sealed
            ),
            upload_enabled: state.is_sealed(),
            error_message: state.error_message().map(|s| s.to_string()),
        }
    }
}

/// 状态管理器
///
/// 负责管理采集流程状态的转换和通知监听者
pub struct StateManager {
    /// 当前状态（使用 ArcSwap 实现无锁读取）
    state: ArcSwap<AppState>,

    /// 状态变更监听器列表
    listeners: Arc<tokio::sync::Mutex<Vec<mpsc::Sender<AppState>>>>,
}

impl StateManager {
    /// 创建新的状态管理器
    ///
    /// # Examples
    ///
    /// ```
    /// use gooji_lib::state::StateManager;
    ///
    /// let manager = StateManager::new();
    /// assert!(manager.current().is_idle());
    /// ```
    pub fn new() -> Self {
        Self {
            state: ArcSwap::new(Arc::new(AppState::Idle)),
            listeners: Arc::new(tokio::sync::Mutex::new(Vec::new())),
        }
    }

    /// 获取当前状态
    ///
    /// 此方法是无锁的，可以在任何线程安全地调用
    pub fn current(&self) -> Arc<AppState> {
        self.state.load_full()
    }

    /// 转换到新状态
    ///
    /// 验证状态转换的合法性，如果合法则更新状态并通知所有监听者
    ///
    /// # Errors
    ///
    /// 如果状态转换不合法，返回 [`StateError::InvalidTransition`]
    ///
    /// # Examples
    ///
    /// ```
    /// use gooji_lib::state::{AppState, StateManager};
    ///
    /// let manager = StateManager::new();
    ///
    /// // 合法转换
    /// assert!(manager.transition(AppState::acquiring()).is_ok());
    ///
    /// // 非法转换
    /// assert!(manager.transition(AppState::uploading()).is_err());
    /// ```
    pub fn transition(&self, new_state: AppState) -> StateResult<()> {
        let current = self.current();

        if !Self::is_valid_transition(&current, &new_state) {
            return Err(StateError::InvalidTransition {
                from: (*current).clone(),
                to: new_state,
            });
        }

        self.state.store(Arc::new(new_state.clone()));
        self.notify_listeners(new_state);

        Ok(())
    }

    /// 添加状态变更监听器
    ///
    /// 返回的接收器将接收所有状态变更通知
    pub async fn subscribe(&self) -> mpsc::Receiver<AppState> {
        let (tx, rx) = mpsc::channel(32);
        let mut listeners = self.listeners.lock().await;
        listeners.push(tx);
        rx
    }

    /// 移除所有已关闭的监听器
    pub async fn cleanup_listeners(&self) {
        let mut listeners = self.listeners.lock().await;
        listeners.retain(|tx| !tx.is_closed());
    }

    /// 获取当前监听器数量
    pub async fn listener_count(&self) -> usize {
        self.listeners.lock().await.len()
    }

    /// 强制设置状态（跳过验证）
    ///
    /// **警告**: 此方法跳过状态转换验证，仅在特殊情况下使用
    /// （例如错误恢复）
    pub fn force_set(&self, new_state: AppState) {
        self.state.store(Arc::new(new_state.clone()));
        self.notify_listeners(new_state);
    }

    /// 重置为空闲状态
    pub fn reset(&self) {
        self.force_set(AppState::Idle);
    }

    /// 通知所有监听者状态变更
    ///
    /// 如果有 tokio 运行时，异步通知；否则静默失败
    fn notify_listeners(&self, new_state: AppState) {
        let listeners = Arc::clone(&self.listeners);

        if tokio::runtime::Handle::try_current().is_ok() {
            tokio::spawn(async move {
                let listeners_guard = listeners.lock().await;
                for listener in listeners_guard.iter() {
                    // 使用 try_send 避免阻塞
                    let _ = listener.try_send(new_state.clone());
                }
            });
        }
    }

    /// 验证状态转换是否合法
    fn is_valid_transition(from: &AppState, to: &AppState) -> bool {
        use AppState::*;

        match (from, to) {
            // 从 Idle 可以开始协商设备
            (Idle, Acquiring) => true,

            // 协商结束：就绪或失败
            (Acquiring, Ready) => true,
            (Acquiring, Error(_)) => true,

            // 就绪后可以录制、重新协商或释放设备
            (Ready, Recording) => true,
            (Ready, Acquiring) => true,
            (Ready, Idle) => true,

            // 停止录制即封存
            (Recording, Sealed) => true,

            // 封存后可以重录、上传或放弃
            (Sealed, Recording) => true,
            (Sealed, Uploading) => true,
            (Sealed, Idle) => true,

            // 上传失败回到 Sealed（产物保留，可重新提交），成功回到 Idle
            (Uploading, Sealed) => true,
            (Uploading, Idle) => true,

            // 从 Error 可以重试或复位
            (Error(_), Acquiring) => true,
            (Error(_), Idle) => true,

            // 任何状态都可以转换到 Error
            (_, Error(_)) => true,

            // 其他转换不合法
            _ => false,
        }
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_creation() {
        let idle = AppState::idle();
        assert!(idle.is_idle());
        assert_eq!(idle.name(), "Idle");

        let acquiring = AppState::acquiring();
        assert!(acquiring.is_acquiring());

        let ready = AppState::ready();
        assert!(ready.is_ready());

        let recording = AppState::recording();
        assert!(recording.is_recording());

        let sealed = AppState::sealed();
        assert!(sealed.is_sealed());

        let uploading = AppState::uploading();
        assert!(uploading.is_uploading());

        let error = AppState::error("test error");
        assert!(error.is_error());
        assert_eq!(error.error_message(), Some("test error"));
    }

    #[test]
    fn test_state_manager_creation() {
        let manager = StateManager::new();
        assert!(manager.current().is_idle());
    }

    #[test]
    fn test_valid_capture_flow() {
        let manager = StateManager::new();

        assert!(manager.transition(AppState::acquiring()).is_ok());
        assert!(manager.transition(AppState::ready()).is_ok());
        assert!(manager.transition(AppState::recording()).is_ok());
        assert!(manager.transition(AppState::sealed()).is_ok());
        assert!(manager.transition(AppState::uploading()).is_ok());
        assert!(manager.transition(AppState::idle()).is_ok());
    }

    #[test]
    fn test_upload_failure_returns_to_sealed() {
        let manager = StateManager::new();

        manager.transition(AppState::acquiring()).unwrap();
        manager.transition(AppState::ready()).unwrap();
        manager.transition(AppState::recording()).unwrap();
        manager.transition(AppState::sealed()).unwrap();
        manager.transition(AppState::uploading()).unwrap();

        // 上传失败，产物保留以便重新提交
        assert!(manager.transition(AppState::sealed()).is_ok());
        assert!(manager.transition(AppState::uploading()).is_ok());
    }

    #[test]
    fn test_re_record_from_sealed() {
        let manager = StateManager::new();

        manager.transition(AppState::acquiring()).unwrap();
        manager.transition(AppState::ready()).unwrap();
        manager.transition(AppState::recording()).unwrap();
        manager.transition(AppState::sealed()).unwrap();

        assert!(manager.transition(AppState::recording()).is_ok());
    }

    #[test]
    fn test_invalid_transitions() {
        let manager = StateManager::new();

        // Idle -> Uploading (invalid)
        let result = manager.transition(AppState::uploading());
        assert!(matches!(
            result,
            Err(StateError::InvalidTransition { .. })
        ));

        // Idle -> Recording (invalid)
        assert!(manager.transition(AppState::recording()).is_err());

        manager.transition(AppState::acquiring()).unwrap();

        // Acquiring -> Recording (invalid)
        assert!(manager.transition(AppState::recording()).is_err());
    }

    #[test]
    fn test_error_state_transitions() {
        let manager = StateManager::new();

        manager.transition(AppState::acquiring()).unwrap();
        assert!(manager
            .transition(AppState::error("permission denied"))
            .is_ok());

        // Error -> Acquiring (重试)
        assert!(manager.transition(AppState::acquiring()).is_ok());

        manager.force_set(AppState::error("again"));

        // Error -> Idle (复位)
        assert!(manager.transition(AppState::idle()).is_ok());
    }

    #[test]
    fn test_force_set_and_reset() {
        let manager = StateManager::new();

        manager.force_set(AppState::uploading());
        assert!(manager.current().is_uploading());

        manager.reset();
        assert!(manager.current().is_idle());
    }

    #[test]
    fn test_state_change_event() {
        let event = StateChangeEvent::from(&AppState::ready());
        assert_eq!(event.state, "Ready");
        assert!(event.recording_enabled);
        assert!(!event.upload_enabled);
        assert!(event.error_message.is_none());

        let event = StateChangeEvent::from(&AppState::sealed());
        assert!(event.recording_enabled);
        assert!(event.upload_enabled);

        let event = StateChangeEvent::from(&AppState::error("boom"));
        assert!(!event.recording_enabled);
        assert!(!event.upload_enabled);
        assert_eq!(event.error_message, Some("boom".to_string()));
    }

    #[test]
    fn test_state_change_event_serialization() {
        let event = StateChangeEvent::from(&AppState::sealed());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("Sealed"));
        assert!(json.contains("upload_enabled"));
    }

    #[tokio::test]
    async fn test_listener_count() {
        let manager = StateManager::new();

        assert_eq!(manager.listener_count().await, 0);

        let _rx1 = manager.subscribe().await;
        assert_eq!(manager.listener_count().await, 1);

        let rx2 = manager.subscribe().await;
        assert_eq!(manager.listener_count().await, 2);

        drop(rx2);
        manager.cleanup_listeners().await;
        assert_eq!(manager.listener_count().await, 1);
    }

    #[tokio::test]
    async fn test_listener_receives_transitions() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe().await;

        manager.transition(AppState::acquiring()).unwrap();

        let received =
            tokio::time::timeout(tokio::time::Duration::from_millis(200), rx.recv()).await;

        assert_eq!(received.unwrap(), Some(AppState::Acquiring));
    }
}
