//! Sprintly 命令行向导
//!
//! `sprintly-onboard`                   注册引导（4 步）
//! `sprintly-onboard workspace <owner>` 工作区创建（3 步）
//!
//! 每步逐个询问字段；输入 `:back` 回到上一步，`:quit` 放弃。最后一步校验通过后提交，失败可重试。

use std::sync::Arc;

use anyhow::Context;
use sprintly::config::load_config_or_default;
use sprintly::notify::{create_notifier_from_config, Notifier};
use sprintly::observability;
use sprintly::store::{JsonFileStore, RecordStore};
use sprintly::wizard::{
    OnboardingPlan, SubmissionPlan, WizardController, WizardDefinition, WizardEvent, WorkspacePlan,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config_or_default(None);
    let store: Arc<dyn RecordStore> = Arc::new(
        JsonFileStore::open(cfg.app.store_path())
            .await
            .context("Failed to open record store")?,
    );
    let notifier: Arc<dyn Notifier> = Arc::from(create_notifier_from_config(&cfg.notify));
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("workspace") => {
            let owner = args
                .get(1)
                .context("usage: sprintly-onboard workspace <owner-account-id>")?;
            let plan = WorkspacePlan::new(owner.as_str());
            run_wizard(WizardController::new(plan, store, notifier), &mut input).await
        }
        None | Some("onboarding") => {
            let plan = OnboardingPlan {
                admin_email: cfg.notify.admin_email.clone(),
            };
            run_wizard(WizardController::new(plan, store, notifier), &mut input).await
        }
        Some(other) => anyhow::bail!("unknown wizard '{other}' (expected onboarding or workspace)"),
    }
}

enum Answer {
    Value(String),
    Back,
    Quit,
}

async fn ask(input: &mut Input, prompt: &str) -> anyhow::Result<Answer> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;
    Ok(match input.next_line().await? {
        None => Answer::Quit,
        Some(line) => match line.trim() {
            ":quit" => Answer::Quit,
            ":back" => Answer::Back,
            _ => Answer::Value(line),
        },
    })
}

async fn run_wizard<P: SubmissionPlan>(
    mut controller: WizardController<P>,
    input: &mut Input,
) -> anyhow::Result<()> {
    let mut last_prompted = None;
    loop {
        let step = controller.state().current_step();
        let total = controller.state().total_steps();
        println!("\n[{step}/{total}] {}", <P::Wizard as WizardDefinition>::step_title(step));

        // 进入新的一步时询问全部字段，校验失败后只追问无效字段
        let ask_all = last_prompted != Some(step);
        last_prompted = Some(step);
        let mut went_back = false;
        for spec in <P::Wizard as WizardDefinition>::step_fields(step) {
            if !ask_all && !controller.state().validation_errors().contains(&spec.name) {
                continue;
            }
            let current = controller.state().field(spec.name).unwrap_or("").to_string();
            let prompt = if current.is_empty() {
                format!("  {}: ", spec.label)
            } else {
                format!("  {} [{current}]: ", spec.label)
            };
            match ask(input, &prompt).await? {
                Answer::Quit => {
                    println!("Cancelled.");
                    controller.dispatch(WizardEvent::Reset);
                    return Ok(());
                }
                Answer::Back => {
                    controller.dispatch(WizardEvent::Back);
                    went_back = true;
                    break;
                }
                // 直接回车保留已有值
                Answer::Value(v) if v.trim().is_empty() && !current.is_empty() => {}
                Answer::Value(v) => controller.dispatch(WizardEvent::set(spec.name, v)),
            }
        }
        if went_back {
            continue;
        }

        if !controller.state().can_advance() {
            println!("  Please fix: {}", controller.state().validation_errors().join(", "));
            continue;
        }

        if !controller.state().is_terminal_step() {
            controller.dispatch(WizardEvent::Next);
            continue;
        }

        match controller.submit().await {
            Ok(report) => {
                println!(
                    "\nDone. Created {} ({} related records, {} notifications sent, {} failed).",
                    report.primary_id,
                    report.dependents_written,
                    report.notifications_sent(),
                    report.notifications_failed()
                );
                return Ok(());
            }
            Err(e) => {
                println!("\nSomething went wrong: {e}");
                match ask(input, "Retry? (y/n): ").await? {
                    Answer::Value(v) if v.trim().eq_ignore_ascii_case("y") => {
                        // 重新询问最后一步，便于输入 :back 修改前面的字段
                        last_prompted = None;
                        continue;
                    }
                    _ => {
                        controller.dispatch(WizardEvent::Reset);
                        return Ok(());
                    }
                }
            }
        }
    }
}
