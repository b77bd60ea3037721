use std::path::Path;

use egobot_contracts::prompts::action::{
    self, render_task_prompt, GRIPPER_TRAJECTORY_PROMPT, MULTI_STEP_PLAN_PROMPT,
};
use egobot_contracts::results::ParsedResult;

use crate::client::ReasoningClient;
use crate::config::Config;
use crate::error::Result;
use crate::normalize::normalize_result;

pub const GRIPPER_TRAJECTORY_LABEL: &str = "gripper_trajectory";
pub const MULTI_STEP_PLAN_LABEL: &str = "multi_step_plan";

#[derive(Clone)]
pub struct ActionPlanner {
    client: ReasoningClient,
}

impl ActionPlanner {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::from_client(ReasoningClient::new(config)?))
    }

    pub fn from_client(client: ReasoningClient) -> Self {
        Self { client }
    }

    pub fn plan_gripper_trajectory(&self, image_path: &Path, task: &str) -> Result<ParsedResult> {
        self.plan(image_path, GRIPPER_TRAJECTORY_PROMPT, task, GRIPPER_TRAJECTORY_LABEL)
    }

    pub fn plan_multi_step(&self, image_path: &Path, task: &str) -> Result<ParsedResult> {
        self.plan(image_path, MULTI_STEP_PLAN_PROMPT, task, MULTI_STEP_PLAN_LABEL)
    }

    fn plan(
        &self,
        image_path: &Path,
        template: &str,
        task: &str,
        label: &str,
    ) -> Result<ParsedResult> {
        let prompt = render_task_prompt(template, task);
        let response =
            self.client
                .reason_about_image(image_path, &prompt, action::SYSTEM_PROMPT, true)?;
        Ok(normalize_result(label, &response))
    }
}
