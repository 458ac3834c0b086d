use crate::models::Platform;

/// System prompt for persona generation. Reply must be a JSON object with
/// `platformBio`, `tone` and `styleNotes`.
pub const GENERATE_PERSONA_SYSTEM: &str = r#"你是一个帮助用户建立社交媒体人设的助手。

## 任务
根据用户对三个问题的回答，生成一个简洁的平台人设。

## 输出格式
必须返回有效的 JSON，格式如下：
{
  "platformBio": "一句话描述（15-30字）",
  "tone": "2-4个语气关键词，逗号分隔",
  "styleNotes": "1-2个具体的风格建议（30-50字）"
}

## 要求
- platformBio 要简洁有力，像 slogan
- tone 要具体，不要太抽象
- styleNotes 要实用，能指导写作

只返回 JSON，不要有其他内容。"#;

pub const UNANSWERED: &str = "(未回答)";

/// The three persona questions asked for a platform, in order.
pub fn persona_questions(platform: Platform) -> [&'static str; 3] {
    match platform {
        Platform::Twitter => [
            "你在 Twitter 上想给人什么印象？（比如：专业、有趣、犀利、温和...）",
            "你的目标读者是谁？他们关心什么话题？",
            "有没有你特别喜欢或讨厌的表达方式？（比如：喜欢用比喻、讨厌说教...）",
        ],
        Platform::Xiaohongshu => [
            "你在小红书上想给人什么印象？（比如：专业博主、生活分享者、学习者...）",
            "你的目标读者是谁？他们在小红书上找什么？",
            "有没有你特别喜欢或讨厌的表达方式？（比如：喜欢用emoji、讨厌太营销...）",
        ],
        Platform::Wechat => [
            "你在朋友圈想给朋友什么印象？（比如：有思考的、有趣的、低调的...）",
            "你的朋友圈主要是什么人？（同事、朋友、客户...）",
            "有没有你特别喜欢或讨厌的朋友圈风格？",
        ],
        Platform::Linkedin => [
            "你在 LinkedIn 上想建立什么样的职业形象？",
            "你的目标受众是谁？（同行、潜在客户、招聘者...）",
            "有没有你特别喜欢或讨厌的 LinkedIn 内容风格？",
        ],
    }
}

/// User turn for persona generation: the platform, then each question paired
/// with its answer.
pub fn build_persona_user_prompt(platform: Platform, answers: &[String]) -> String {
    let qa = persona_questions(platform)
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let answer = answers
                .get(i)
                .map(String::as_str)
                .filter(|a| !a.is_empty())
                .unwrap_or(UNANSWERED);
            format!("Q: {question}\nA: {answer}")
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("平台: {}\n\n{}", platform.display_name(), qa)
}
