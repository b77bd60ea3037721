pub const SYSTEM_PROMPT: &str = "You are the decision-making module of an assistive robot. \
Based on egocentric observations, decide the next action. \
Be safe, helpful, and precise.";

pub const NEXT_ACTION_PROMPT: &str = r#"Based on this egocentric robot view, determine the best next action.

Respond in JSON:
{
  "scene_summary": "",
  "human_interaction_needed": false,
  "safety_ok": true,
  "next_action": "",
  "action_description": "",
  "priority": "low|medium|high|urgent"
}"#;

pub const TASK_PLACEHOLDER: &str = "{task}";

pub const GRIPPER_TRAJECTORY_PROMPT: &str = r#"You are given the task: "{task}"

From this egocentric view, specify the 2D trajectory for the robot gripper in pixel space.
Coordinates normalized to 0-1000. Origin is top-left. X=right, Y=down.

Respond in JSON:
{
  "trajectory": [{"point_2d": [0, 0], "label": ""}],
  "task": "",
  "feasibility": "feasible|difficult|infeasible",
  "notes": ""
}"#;

pub const MULTI_STEP_PLAN_PROMPT: &str = r#"Create a multi-step plan to accomplish: "{task}"

Respond in JSON:
{
  "task": "",
  "steps": [
    {"step_number": 1, "action": "", "completion_check": "", "safety_note": null}
  ],
  "estimated_total_steps": 0
}"#;

pub fn render_task_prompt(template: &str, task: &str) -> String {
    template.replace(TASK_PLACEHOLDER, task)
}

#[cfg(test)]
mod tests {
    use super::{render_task_prompt, GRIPPER_TRAJECTORY_PROMPT, MULTI_STEP_PLAN_PROMPT};

    #[test]
    fn task_is_substituted_once_and_json_braces_survive() {
        let prompt = render_task_prompt(MULTI_STEP_PLAN_PROMPT, "fetch the red mug");
        assert!(prompt.starts_with("Create a multi-step plan to accomplish: \"fetch the red mug\""));
        assert!(!prompt.contains("{task}"));
        assert!(prompt.contains("\"estimated_total_steps\": 0"));

        let trajectory = render_task_prompt(GRIPPER_TRAJECTORY_PROMPT, "open the drawer");
        assert!(trajectory.contains("{\"point_2d\": [0, 0], \"label\": \"\"}"));
    }
}
