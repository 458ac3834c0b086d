//! Enumerated transform options and the prompt fragments keyed by them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputLength {
    Concise,
    #[default]
    Normal,
    Detailed,
}

impl OutputLength {
    pub const ALL: [OutputLength; 3] = [
        OutputLength::Concise,
        OutputLength::Normal,
        OutputLength::Detailed,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputLanguage {
    Zh,
    En,
    #[default]
    Auto,
}

impl OutputLanguage {
    pub const ALL: [OutputLanguage; 3] = [OutputLanguage::Zh, OutputLanguage::En, OutputLanguage::Auto];

    /// Short badge used in the collapsed settings summary.
    pub fn badge(self) -> &'static str {
        match self {
            OutputLanguage::Zh => "中文",
            OutputLanguage::En => "EN",
            OutputLanguage::Auto => "AUTO",
        }
    }
}

/// Who the post is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    Peers,
    Beginners,
    Leadership,
    Friends,
}

impl Audience {
    pub const ALL: [Audience; 4] = [
        Audience::Peers,
        Audience::Beginners,
        Audience::Leadership,
        Audience::Friends,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Audience::Peers => "同行",
            Audience::Beginners => "小白",
            Audience::Leadership => "老板/客户",
            Audience::Friends => "朋友",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Audience::Peers => "专业人士、同行，可以用行业术语，聊深度话题",
            Audience::Beginners => "新手、外行人，需要用简单易懂的语言解释",
            Audience::Leadership => "领导、客户、投资人，强调价值和结果",
            Audience::Friends => "朋友、熟人，轻松随意，可以开玩笑",
        }
    }
}

/// The intent the post is framed around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentAngle {
    #[default]
    Sharing,
    Asking,
    Opinion,
    Casual,
    Roast,
    Teaching,
    Story,
}

impl ContentAngle {
    pub const ALL: [ContentAngle; 7] = [
        ContentAngle::Sharing,
        ContentAngle::Asking,
        ContentAngle::Opinion,
        ContentAngle::Casual,
        ContentAngle::Roast,
        ContentAngle::Teaching,
        ContentAngle::Story,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContentAngle::Sharing => "分享经验",
            ContentAngle::Asking => "求助讨论",
            ContentAngle::Opinion => "观点输出",
            ContentAngle::Casual => "随便记录",
            ContentAngle::Roast => "搞笑吐槽",
            ContentAngle::Teaching => "科普教学",
            ContentAngle::Story => "讲个故事",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ContentAngle::Sharing => "\"我发现...\" \"最近学到...\" 分享经验和心得",
            ContentAngle::Asking => "\"有人遇到过...?\" \"大家怎么看...\" 寻求反馈和讨论",
            ContentAngle::Opinion => "\"我认为...\" \"其实...\" 输出观点和立场",
            ContentAngle::Casual => "轻松记录，不需要太正式，想到什么说什么",
            ContentAngle::Roast => "\"这届XX不行啊...\" \"离谱...\" 调侃、自嘲、吐槽，带点幽默感",
            ContentAngle::Teaching => "\"一文讲清...\" \"其实原理很简单...\" 解释概念、科普、教程向",
            ContentAngle::Story => "\"那天我...\" \"说个真事...\" 个人经历、叙事、有画面感",
        }
    }
}
