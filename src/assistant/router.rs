//! 意图路由状态机（纯函数部分）
//!
//! `step` 根据当前状态与用户文本决定：直接回复并转移，或发起一个外部调用；
//! 外部调用的结果交给 `finish` 得到新状态与回复文本。外部调用失败由调用方统一回到 Idle。

use crate::assistant::{classify, ConversationState, CreateTaskStep, FindSimilarStep, Intent};
use crate::llm::ChatReply;
use crate::store::{NewTask, Project, ScoredTask, Task};

pub const ASK_PROJECT: &str =
    "Sure, let's create a task. Which project should it go in? Give me the project id or name.";
pub const ASK_QUERY: &str =
    "What should I look for? Describe the task and I'll find similar ones.";
pub const APOLOGY: &str = "Sorry, I couldn't reach the assistant. Please try again in a moment.";

/// 展示参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub max_similar_results: usize,
    pub description_preview_chars: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_similar_results: 5,
            description_preview_chars: 100,
        }
    }
}

/// 需要执行的外部调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LookupProject(String),
    CreateTask { project: Project, task: NewTask },
    SearchSimilar(String),
    Delegate(String),
}

/// 外部调用的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Project {
        ident: String,
        found: Option<Project>,
    },
    Created {
        project: Project,
        task: Task,
    },
    Similar(Vec<ScoredTask>),
    Chat(ChatReply),
}

/// `step` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// 无外部调用
    Reply {
        next: ConversationState,
        text: String,
    },
    /// 需要外部调用，状态暂不变
    Call(Effect),
}

fn reply(next: ConversationState, text: impl Into<String>) -> Step {
    Step::Reply {
        next,
        text: text.into(),
    }
}

fn is_skip(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("skip")
}

fn is_yes(text: &str) -> bool {
    let t = text.trim();
    t.eq_ignore_ascii_case("yes") || t.eq_ignore_ascii_case("y")
}

pub fn step(state: &ConversationState, text: &str) -> Step {
    use ConversationState::{CreatingTask, FindingSimilar, Idle};

    match state {
        Idle => match classify(text) {
            Intent::CreateTask => reply(CreatingTask(CreateTaskStep::AskProject), ASK_PROJECT),
            Intent::FindSimilar => reply(FindingSimilar(FindSimilarStep::AskQuery), ASK_QUERY),
            Intent::Delegate => Step::Call(Effect::Delegate(text.to_string())),
        },
        CreatingTask(CreateTaskStep::AskProject) => {
            Step::Call(Effect::LookupProject(text.trim().to_string()))
        }
        CreatingTask(CreateTaskStep::AskTaskName { project }) => reply(
            CreatingTask(CreateTaskStep::AskDescription {
                project: project.clone(),
                task_name: text.to_string(),
            }),
            "Add a short description, or type \"skip\".",
        ),
        CreatingTask(CreateTaskStep::AskDescription { project, task_name }) => {
            let description = if is_skip(text) {
                String::new()
            } else {
                text.to_string()
            };
            let summary = if description.is_empty() {
                format!("Create task \"{task_name}\" in {}? (yes/no)", project.name)
            } else {
                format!(
                    "Create task \"{task_name}\" in {} with description \"{description}\"? (yes/no)",
                    project.name
                )
            };
            reply(
                CreatingTask(CreateTaskStep::Confirm {
                    project: project.clone(),
                    task_name: task_name.clone(),
                    description,
                }),
                summary,
            )
        }
        CreatingTask(CreateTaskStep::Confirm {
            project,
            task_name,
            description,
        }) => {
            if is_yes(text) {
                Step::Call(Effect::CreateTask {
                    project: project.clone(),
                    task: NewTask {
                        project_id: project.id.clone(),
                        name: task_name.clone(),
                        description: description.clone(),
                    },
                })
            } else {
                reply(Idle, "Okay, I won't create that task.")
            }
        }
        FindingSimilar(FindSimilarStep::AskQuery) => {
            Step::Call(Effect::SearchSimilar(text.trim().to_string()))
        }
    }
}

/// 根据外部调用结果给出新状态与回复
pub fn finish(outcome: Outcome, settings: &RenderSettings) -> (ConversationState, String) {
    match outcome {
        Outcome::Project {
            found: Some(project),
            ..
        } => {
            let text = format!("Got it: {}. What should the task be called?", project.name);
            (
                ConversationState::CreatingTask(CreateTaskStep::AskTaskName { project }),
                text,
            )
        }
        Outcome::Project { ident, found: None } => (
            ConversationState::CreatingTask(CreateTaskStep::AskProject),
            format!("I couldn't find a project matching \"{ident}\". Which project should I use?"),
        ),
        Outcome::Created { project, task } => (
            ConversationState::Idle,
            format!("Created task \"{}\" in {}.", task.name, project.name),
        ),
        Outcome::Similar(hits) => (ConversationState::Idle, render_similar(&hits, settings)),
        Outcome::Chat(reply) => (
            ConversationState::Idle,
            reply.visible_text().unwrap_or_default(),
        ),
    }
}

fn render_similar(hits: &[ScoredTask], settings: &RenderSettings) -> String {
    if hits.is_empty() {
        return "I couldn't find any similar tasks.".to_string();
    }
    let mut out = String::from("Here are the most similar tasks:");
    for (i, hit) in hits.iter().take(settings.max_similar_results).enumerate() {
        out.push_str(&format!("\n{}. {}", i + 1, hit.task.name));
        let preview = preview(&hit.task.description, settings.description_preview_chars);
        if !preview.is_empty() {
            out.push_str(&format!(": {preview}"));
        }
    }
    out
}

/// 截断到最多 `limit` 个字符（含省略号）
pub fn preview(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= limit {
        return text.to_string();
    }
    // 放不下省略号时直接截断
    if limit < 3 {
        return text.chars().take(limit).collect();
    }
    let head: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", head.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apollo() -> Project {
        Project {
            id: "p-1".into(),
            name: "Apollo".into(),
        }
    }

    fn at_description() -> ConversationState {
        ConversationState::CreatingTask(CreateTaskStep::AskDescription {
            project: apollo(),
            task_name: "Fix login".into(),
        })
    }

    #[test]
    fn test_new_task_from_idle_never_delegates() {
        match step(&ConversationState::Idle, "new task please") {
            Step::Reply { next, text } => {
                assert_eq!(next, ConversationState::CreatingTask(CreateTaskStep::AskProject));
                assert_eq!(text, ASK_PROJECT);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_skip_any_case_gives_empty_description() {
        for skip in ["skip", "SKIP", " Skip "] {
            match step(&at_description(), skip) {
                Step::Reply {
                    next: ConversationState::CreatingTask(CreateTaskStep::Confirm { description, .. }),
                    ..
                } => assert!(description.is_empty()),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_description_kept_verbatim() {
        match step(&at_description(), "  Users loop on OAuth ") {
            Step::Reply {
                next: ConversationState::CreatingTask(CreateTaskStep::Confirm { description, .. }),
                ..
            } => assert_eq!(description, "  Users loop on OAuth "),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_task_name_advances_unconditionally() {
        let state = ConversationState::CreatingTask(CreateTaskStep::AskTaskName { project: apollo() });
        match step(&state, "find similar") {
            Step::Reply {
                next: ConversationState::CreatingTask(CreateTaskStep::AskDescription { task_name, .. }),
                ..
            } => assert_eq!(task_name, "find similar"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_confirm_only_yes_tokens_create() {
        let confirm = ConversationState::CreatingTask(CreateTaskStep::Confirm {
            project: apollo(),
            task_name: "Fix login".into(),
            description: String::new(),
        });
        for yes in ["yes", "Y", " YES "] {
            assert!(matches!(step(&confirm, yes), Step::Call(Effect::CreateTask { .. })));
        }
        for no in ["no", "yep", "sure", "yes please", ""] {
            assert!(matches!(
                step(&confirm, no),
                Step::Reply {
                    next: ConversationState::Idle,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_unknown_project_reprompts() {
        let (next, text) = finish(
            Outcome::Project {
                ident: "zeus".into(),
                found: None,
            },
            &RenderSettings::default(),
        );
        assert_eq!(next, ConversationState::CreatingTask(CreateTaskStep::AskProject));
        assert!(text.contains("zeus"));
    }

    #[test]
    fn test_preview_is_bounded() {
        let long = "x".repeat(250);
        assert_eq!(preview(&long, 100).chars().count(), 100);
        assert_eq!(preview("short", 100), "short");
    }

    #[test]
    fn test_preview_tiny_limit_never_exceeds() {
        assert_eq!(preview("abcdefgh", 2), "ab");
        assert_eq!(preview("abcdefgh", 0), "");
        assert_eq!(preview("abcdefgh", 3), "...");
    }

    #[test]
    fn test_similar_rendering_respects_limit() {
        let hits: Vec<ScoredTask> = (0..8)
            .map(|i| ScoredTask {
                task: Task {
                    id: format!("t{i}"),
                    project_id: "p-1".into(),
                    name: format!("Task {i}"),
                    description: "d".repeat(300),
                    status: "todo".into(),
                },
                score: 1.0,
            })
            .collect();
        let settings = RenderSettings::default();
        let text = render_similar(&hits, &settings);
        assert_eq!(text.lines().count(), 1 + settings.max_similar_results);
        assert!(text.lines().skip(1).all(|l| l.chars().count() < 120));
    }
}
