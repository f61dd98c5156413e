//! 测评会话 - 流程层
//!
//! 核心职责：编排"选题 → 出题 → 录音 → 评分 → 推进"的完整测试流程。
//!
//! ```text
//! Presenting -> AwaitingRecording -> Recorded -> Advancing -> Presenting(下一题)
//!                                                          -> Completed(定级)
//! ```
//!
//! 设计约束：
//! - 所有测试状态（[`TestState`]）由本模块独占，外界只能通过
//!   具名的状态转移方法修改，通过 [`TestSnapshot`] 只读观察；
//! - 不持有任何稀缺资源（设备在 services / infrastructure 层）；
//! - 只依赖业务能力（selector / scorer / recording）。

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AppError, AppResult, SessionError};
use crate::models::{Level, Question, QuestionBank, UserResponse};
use crate::services::{
    mean_fluency, AdaptiveSelector, RecordingCompleted, RecordingSession, ResponseScorer,
    MAX_SEQUENCE_LEN,
};

/// 测试状态
///
/// 按时间顺序保存作答历史，索引单调推进（除显式回退外）。
#[derive(Debug, Default)]
pub struct TestState {
    /// 当前题目在自适应序列中的位置
    pub current_index: usize,
    /// 作答历史，插入顺序即作答顺序
    pub history: Vec<UserResponse>,
    /// 本题已完成但尚未确认的录音
    pub pending: Option<RecordingCompleted>,
}

/// `advance` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// 已推进到下一题
    Moved,
    /// 测试结束，给出定级
    Completed(Level),
    /// 本题还没有已完成的录音，忽略本次操作
    NotRecorded,
}

/// 供渲染层使用的只读快照
#[derive(Debug, Clone, Serialize)]
pub struct TestSnapshot {
    pub current_index: usize,
    pub total_questions: usize,
    /// 进度分数，(current_index + 1) / min(序列长度, 8)
    pub progress: f64,
    pub question_id: String,
    pub question_text: String,
    pub question_level: Level,
    pub expected_length: f64,
    pub is_recording: bool,
    pub has_recorded: bool,
    pub answered: usize,
    pub outcome: Option<Level>,
}

/// 测评会话（测试控制器）
pub struct TestSession {
    selector: AdaptiveSelector,
    scorer: ResponseScorer,
    recording: RecordingSession,
    state: TestState,
    outcome: Option<Level>,
}

impl TestSession {
    pub fn new(
        bank: Arc<QuestionBank>,
        capture: Arc<dyn crate::infrastructure::MicrophoneCapture>,
        scorer: ResponseScorer,
    ) -> Self {
        Self {
            selector: AdaptiveSelector::new(bank),
            scorer,
            recording: RecordingSession::new(capture),
            state: TestState::default(),
            outcome: None,
        }
    }

    // ========== 查询 ==========

    /// 当前自适应题目序列（纯历史推导，可重复调用）
    pub fn sequence(&self) -> Vec<&Question> {
        self.selector.sequence(&self.state.history)
    }

    /// 当前题目
    ///
    /// 不变量：`current_index` 永远落在序列范围内——序列长度至少为
    /// `min(历史长度 + 1, 8)`，而索引只会在确认作答后加一。
    pub fn current_question(&self) -> &Question {
        self.sequence()[self.state.current_index]
    }

    /// 学习者可见的进度分数
    pub fn progress(&self) -> f64 {
        self.selector
            .progress(self.state.current_index, &self.state.history)
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_recording()
    }

    /// 本题是否已有完成的录音
    pub fn has_recorded(&self) -> bool {
        self.state.pending.is_some()
    }

    /// 本题未确认录音的产物（回放用）
    pub fn pending_recording(&self) -> Option<&RecordingCompleted> {
        self.state.pending.as_ref()
    }

    pub fn history(&self) -> &[UserResponse] {
        &self.state.history
    }

    pub fn outcome(&self) -> Option<Level> {
        self.outcome
    }

    pub fn is_completed(&self) -> bool {
        self.outcome.is_some()
    }

    /// 生成只读快照
    pub fn snapshot(&self) -> TestSnapshot {
        let sequence = self.sequence();
        let question = sequence[self.state.current_index];
        TestSnapshot {
            current_index: self.state.current_index,
            total_questions: sequence.len().min(MAX_SEQUENCE_LEN),
            progress: self.progress(),
            question_id: question.id.clone(),
            question_text: question.text.clone(),
            question_level: question.level,
            expected_length: question.expected_length,
            is_recording: self.recording.is_recording(),
            has_recorded: self.has_recorded(),
            answered: self.state.history.len(),
            outcome: self.outcome,
        }
    }

    // ========== 状态转移 ==========

    /// 开始录制本题的回答
    ///
    /// 权限被拒绝等采集失败只向上返回错误，测试状态不变。
    pub fn start_recording(&mut self) -> AppResult<()> {
        self.guard_not_completed()?;
        // 重新开始录音即隐式放弃本题之前的录音
        self.state.pending = None;
        self.recording.start()?;
        info!("🎙️ 开始录音: 题目 {}", self.current_question().id);
        Ok(())
    }

    /// 停止录音，产物暂存为"待确认"
    pub fn stop_recording(&mut self) -> AppResult<()> {
        self.guard_not_completed()?;
        let completed = self.recording.stop()?;
        info!(
            "✓ 录音完成: 题目 {} ({:.1} 秒)",
            self.current_question().id,
            completed.duration
        );
        self.state.pending = Some(completed);
        Ok(())
    }

    /// 重录：丢弃本题未确认的录音，不产生作答记录
    pub fn reset_recording(&mut self) {
        self.state.pending = None;
        self.recording.reset();
    }

    /// 确认本题作答并推进
    ///
    /// - 没有完成的录音时是无操作（按钮置灰语义），返回 `NotRecorded`；
    /// - 把待确认录音评分为作答记录写入历史：同一题目已有记录则整条
    ///   替换（回退重答不追加重复记录），否则追加；
    /// - 不在序列末尾：索引加一，清空录音状态；
    /// - 在序列末尾：按全历史平均流利度定级，测试终结。
    pub fn advance(&mut self) -> AppResult<AdvanceOutcome> {
        self.guard_not_completed()?;

        let Some(pending) = self.state.pending.take() else {
            return Ok(AdvanceOutcome::NotRecorded);
        };

        let question = self.current_question().clone();
        let response = self.scorer.score(&question, pending.duration);
        info!(
            "📝 记录作答: 题目 {} 流利度 {} 复杂度 {}",
            response.question_id, response.fluency, response.complexity
        );
        self.commit_response(response);
        self.recording.reset();

        let sequence_len = self.sequence().len().min(MAX_SEQUENCE_LEN);
        if self.state.current_index + 1 < sequence_len {
            self.state.current_index += 1;
            Ok(AdvanceOutcome::Moved)
        } else {
            let mean = mean_fluency(&self.state.history);
            let level = Level::from_mean_fluency(mean);
            self.outcome = Some(level);
            info!(
                "🎉 测试完成: 平均流利度 {:.2}，定级 {}",
                mean, level
            );
            Ok(AdvanceOutcome::Completed(level))
        }
    }

    /// 回到上一题
    ///
    /// 只在不是第一题时生效；本题未确认的录音被丢弃（设备释放），
    /// 已写入历史的作答保留，重答时整条替换。
    pub fn go_back(&mut self) -> AppResult<bool> {
        self.guard_not_completed()?;
        if self.state.current_index == 0 {
            return Ok(false);
        }
        self.reset_recording();
        self.state.current_index -= 1;
        info!("⬅️ 回到题目 {}", self.current_question().id);
        Ok(true)
    }

    // ========== 内部辅助 ==========

    fn guard_not_completed(&self) -> AppResult<()> {
        if self.outcome.is_some() {
            return Err(AppError::Session(SessionError::AlreadyCompleted));
        }
        Ok(())
    }

    /// 写入作答记录：同题替换，新题追加
    fn commit_response(&mut self, response: UserResponse) {
        match self
            .state
            .history
            .iter_mut()
            .find(|r| r.question_id == response.question_id)
        {
            Some(existing) => {
                warn!("题目 {} 已有作答记录，整条替换", response.question_id);
                *existing = response;
            }
            None => self.state.history.push(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::SimulatedMicrophone;
    use crate::models::QuestionBank;
    use crate::services::FixedJitter;

    fn session() -> TestSession {
        session_with_mic(Arc::new(SimulatedMicrophone::new()))
    }

    fn session_with_mic(mic: Arc<SimulatedMicrophone>) -> TestSession {
        TestSession::new(
            Arc::new(QuestionBank::builtin().unwrap()),
            mic,
            ResponseScorer::new(Box::new(FixedJitter(0.0))),
        )
    }

    /// 录一段并确认（模拟时长接近 0，流利度恒为 2）
    fn answer_current(session: &mut TestSession) -> AdvanceOutcome {
        session.start_recording().unwrap();
        session.stop_recording().unwrap();
        session.advance().unwrap()
    }

    #[test]
    fn test_initial_state() {
        let session = session();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.current_index, 0);
        assert_eq!(snapshot.question_id, "b1");
        assert_eq!(snapshot.answered, 0);
        assert!(!snapshot.has_recorded);
        assert!((snapshot.progress - 1.0).abs() < f64::EPSILON);
        assert!(snapshot.outcome.is_none());
    }

    #[test]
    fn test_advance_without_recording_is_noop() {
        let mut session = session();
        let outcome = session.advance().unwrap();
        assert_eq!(outcome, AdvanceOutcome::NotRecorded);
        // 状态完全不变
        assert_eq!(session.snapshot().current_index, 0);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_full_test_runs_eight_questions_and_levels_beginner() {
        let mut session = session();

        for i in 0..7 {
            assert_eq!(answer_current(&mut session), AdvanceOutcome::Moved, "第 {} 题", i);
        }
        // 第 8 题：终结并定级。模拟录音时长 ~0 秒 -> 流利度 2 -> 初级
        let outcome = answer_current(&mut session);
        assert_eq!(outcome, AdvanceOutcome::Completed(Level::Beginner));

        assert!(session.is_completed());
        assert_eq!(session.history().len(), 8);
        assert_eq!(session.outcome(), Some(Level::Beginner));
    }

    #[test]
    fn test_operations_after_completion_are_rejected() {
        let mut session = session();
        for _ in 0..8 {
            answer_current(&mut session);
        }
        assert!(matches!(
            session.start_recording().unwrap_err(),
            AppError::Session(SessionError::AlreadyCompleted)
        ));
        assert!(matches!(
            session.advance().unwrap_err(),
            AppError::Session(SessionError::AlreadyCompleted)
        ));
    }

    #[test]
    fn test_reset_recording_discards_without_creating_response() {
        let mut session = session();
        session.start_recording().unwrap();
        session.stop_recording().unwrap();
        assert!(session.has_recorded());

        session.reset_recording();
        assert!(!session.has_recorded());
        assert!(session.history().is_empty());
        // 重录后仍可正常确认
        assert_eq!(answer_current(&mut session), AdvanceOutcome::Moved);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_go_back_then_reanswer_replaces_history_entry() {
        let mut session = session();
        answer_current(&mut session);
        assert_eq!(session.snapshot().current_index, 1);
        assert_eq!(session.history().len(), 1);
        let first_duration = session.history()[0].duration;

        // 回退：已存的作答保留，录音状态清空
        assert!(session.go_back().unwrap());
        assert_eq!(session.snapshot().current_index, 0);
        assert!(!session.has_recorded());
        assert_eq!(session.history().len(), 1);

        // 重答同一题：整条替换而不是追加
        answer_current(&mut session);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].question_id, "b1");
        let _ = first_duration;
    }

    #[test]
    fn test_go_back_at_first_question_is_noop() {
        let mut session = session();
        assert!(!session.go_back().unwrap());
        assert_eq!(session.snapshot().current_index, 0);
    }

    #[test]
    fn test_go_back_discards_pending_recording() {
        let mut session = session();
        answer_current(&mut session);
        session.start_recording().unwrap();
        session.stop_recording().unwrap();
        assert!(session.has_recorded());

        session.go_back().unwrap();
        assert!(!session.has_recorded());
        // 丢弃的待确认录音没有进入历史
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_permission_denied_leaves_state_unchanged() {
        let mut session = session_with_mic(Arc::new(SimulatedMicrophone::denying()));
        let err = session.start_recording().unwrap_err();
        assert!(err.is_permission_denied());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.current_index, 0);
        assert!(!snapshot.is_recording);
        assert!(!snapshot.has_recorded);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_no_leaked_device_across_questions() {
        let mic = Arc::new(SimulatedMicrophone::new());
        let mut session = session_with_mic(mic.clone());

        for _ in 0..3 {
            session.start_recording().unwrap();
            assert_eq!(mic.active_acquisitions(), 1);
            session.stop_recording().unwrap();
            assert_eq!(mic.active_acquisitions(), 0);
            session.advance().unwrap();
        }
    }

    #[test]
    fn test_start_recording_discards_previous_take() {
        let mut session = session();
        session.start_recording().unwrap();
        session.stop_recording().unwrap();
        assert!(session.has_recorded());

        // 不经过显式重录直接再次开始：上一段产物作废
        session.start_recording().unwrap();
        assert!(!session.has_recorded());
        assert!(session.is_recording());
        session.stop_recording().unwrap();
        assert!(session.has_recorded());
    }

    #[test]
    fn test_snapshot_serializes() {
        let session = session();
        let json = serde_json::to_string(&session.snapshot()).unwrap();
        assert!(json.contains("\"question_id\":\"b1\""));
        assert!(json.contains("\"question_level\":\"beginner\""));
    }
}
