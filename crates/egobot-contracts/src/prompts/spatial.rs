pub const SYSTEM_PROMPT: &str = "You are the spatial awareness module of a mobile robot. \
You observe the world from a first-person camera. \
Your job is to understand the 3D layout and report positions.";

pub const SCENE_LAYOUT_PROMPT: &str = r#"Analyze the spatial layout from the robot's egocentric camera.

Respond in JSON:
{
  "obstacles": [{"name": "", "position": "left|center|right", "distance": "near|mid|far"}],
  "free_paths": [],
  "key_objects": [{"name": "", "position": ""}],
  "people": [{"position": "", "activity": ""}]
}"#;

pub const TRAJECTORY_PREDICTION_PROMPT: &str = r#"A moving object is visible from the robot's view.

Respond in JSON:
{
  "object": "",
  "direction": "toward|away|left_to_right|right_to_left|upward|downward",
  "approaching": false,
  "estimated_landing": "",
  "collision_risk": "none|low|medium|high"
}"#;

pub const DISTANCE_ESTIMATION_PROMPT: &str = r#"Estimate the distance to the main subject.

Respond in JSON:
{
  "subject": "",
  "estimated_distance_meters": 0.0,
  "confidence": "low|medium|high",
  "reasoning": ""
}"#;
