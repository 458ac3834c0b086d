//! Transform prompt builder — pure functions, fully deterministic.
//!
//! The system prompt is assembled from fixed fragments keyed by platform,
//! persona, length, language, audience and angle, and always ends with
//! `USER_CONTENT_PLACEHOLDER`.

use crate::llm_client::prompts::USER_CONTENT_PLACEHOLDER;
use crate::models::{
    Audience, ContentAngle, OutputLanguage, OutputLength, Platform, PlatformPersona, Profile,
};

/// Default voice characteristics of a platform.
#[derive(Debug, Clone)]
pub struct PlatformTraits {
    pub tone: &'static str,
    pub style: &'static str,
    pub length: &'static str,
    pub emoji: bool,
}

pub fn get_platform_traits(platform: Platform) -> PlatformTraits {
    match platform {
        Platform::Twitter => PlatformTraits {
            tone: "犀利、观点鲜明",
            style: "短句、hook 开头、引发讨论",
            length: "280字符以内（中文约140字）",
            emoji: false,
        },
        Platform::Xiaohongshu => PlatformTraits {
            tone: "亲切、分享感、真诚",
            style: "口语化、分段清晰、适当emoji",
            length: "500-800字",
            emoji: true,
        },
        Platform::Wechat => PlatformTraits {
            tone: "随性、真实、像跟朋友聊天",
            style: "轻松自然、可以有情绪",
            length: "200-500字",
            emoji: true,
        },
        Platform::Linkedin => PlatformTraits {
            tone: "专业、有深度、insights导向",
            style: "结构化、有观点、商业视角",
            length: "500-1000字",
            emoji: false,
        },
    }
}

/// The knobs a user can turn for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformOptions {
    pub length: OutputLength,
    pub language: OutputLanguage,
    pub audience: Audience,
    pub angle: ContentAngle,
}

/// Output token budget per platform and length.
pub fn max_tokens_for(platform: Platform, length: OutputLength) -> u32 {
    let (concise, normal, detailed) = match platform {
        Platform::Twitter | Platform::Wechat => (256, 512, 1024),
        Platform::Xiaohongshu | Platform::Linkedin => (512, 1024, 2048),
    };
    match length {
        OutputLength::Concise => concise,
        OutputLength::Normal => normal,
        OutputLength::Detailed => detailed,
    }
}

fn concise_limit(platform: Platform) -> &'static str {
    match platform {
        Platform::Twitter => "100字/50词以内",
        Platform::Wechat => "100字以内",
        Platform::Xiaohongshu | Platform::Linkedin => "200字以内",
    }
}

fn length_section(platform: Platform, length: OutputLength, traits: &PlatformTraits) -> String {
    match length {
        OutputLength::Concise => format!(
            "
## 长度要求：简洁 ⚠️ 严格限制
- **只输出 1 个版本**（不要多个版本）
- **字数限制：{}** ← 这是硬性要求，必须遵守
- 只保留最核心的一句话或一个观点
- 删除所有非必要的修饰词、背景说明、例子
- 像写标题或 slogan 一样精炼",
            concise_limit(platform)
        ),
        OutputLength::Normal => format!(
            "
## 长度要求：正常
- 提供 2-3 个不同角度的版本，用 --- 分隔
- {}",
            traits.length
        ),
        OutputLength::Detailed => format!(
            "
## 长度要求：详细
- 提供 2-3 个不同角度的版本，用 --- 分隔
- 充分展开，可以是系列/thread形式
- {}",
            if platform == Platform::Twitter {
                "用 1/ 2/ 3/ 标注 thread"
            } else {
                "分段清晰，层次分明"
            }
        ),
    }
}

fn language_section(language: OutputLanguage) -> &'static str {
    match language {
        OutputLanguage::En => {
            "
## 语言要求：英文
- 必须用英文输出
- 如果用户输入是中文，翻译并改写成地道的英文表达
- 保持意思不变，但要符合英文母语者的表达习惯"
        }
        OutputLanguage::Zh => {
            "
## 语言要求：中文
- 必须用中文输出
- 如果用户输入是英文，翻译并改写成地道的中文表达"
        }
        OutputLanguage::Auto => {
            "
## 语言要求：自动
- 根据平台习惯选择语言
- Twitter/LinkedIn 默认英文，小红书/朋友圈 默认中文
- 但如果用户明显想用另一种语言，尊重用户意图"
        }
    }
}

fn persona_section(persona: Option<&PlatformPersona>) -> String {
    match persona {
        Some(p) if p.is_custom => format!(
            "
## 用户人设（优先级最高）
- 定位: {}
- 语气: {}
- 风格: {}",
            p.platform_bio, p.tone, p.style_notes
        ),
        _ => String::new(),
    }
}

/// Builds the transform system prompt for one platform.
pub fn build_platform_transform_prompt(
    platform: Platform,
    persona: Option<&PlatformPersona>,
    options: &TransformOptions,
) -> String {
    let traits = get_platform_traits(platform);
    let name = platform.display_name();

    let audience = format!(
        "
## 目标受众：{}
- {}
- 根据受众调整用词、解释深度和表达方式",
        options.audience.label(),
        options.audience.description()
    );

    let angle = format!(
        "
## 内容角度：{}
- {}
- 用这个角度来组织和呈现内容",
        options.angle.label(),
        options.angle.description()
    );

    format!(
        "你是一个帮助用户将想法转换为 {name} 内容的助手。

## 平台特性
- 语气: {tone}
- 风格: {style}
- Emoji: {emoji}
{persona}
{audience}
{angle}

{length}
{language}

## 输出要求
- 直接输出内容，不需要额外解释
- 保持用户的原有观点和风格
- 符合 {name} 的阅读习惯

{placeholder}",
        tone = traits.tone,
        style = traits.style,
        emoji = if traits.emoji { "适当使用" } else { "少用或不用" },
        persona = persona_section(persona),
        length = length_section(platform, options.length, &traits),
        language = language_section(options.language),
        placeholder = USER_CONTENT_PLACEHOLDER,
    )
}

/// Adds the global profile voice (tone + avoid-words) to a built prompt.
/// The section is inserted before the trailing placeholder so the prompt
/// keeps ending with it.
pub fn with_profile_context(prompt: String, profile: &Profile) -> String {
    let avoid = if profile.avoid_words.is_empty() {
        "无".to_string()
    } else {
        profile.avoid_words.join(", ")
    };
    let context = format!(
        "\n\n## 用户基础风格\n- 语气: {}\n- 避免词汇: {}\n",
        profile.tone.label(),
        avoid
    );

    match prompt.strip_suffix(USER_CONTENT_PLACEHOLDER) {
        Some(base) => format!("{}{}\n{}", base.trim_end(), context, USER_CONTENT_PLACEHOLDER),
        None => prompt + &context,
    }
}
