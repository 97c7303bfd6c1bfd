//! Localization — static UI string bundles keyed by language.
//!
//! DESIGN
//! ======
//! One `UiStrings` table per supported language, all `&'static str`. Other
//! modules never format raw error detail for users; they pick a string from
//! here instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::Verdict;

// =============================================================================
// LANGUAGE
// =============================================================================

/// UI and answer language selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Hi,
    Ta,
    Gu,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Hi, Language::Ta, Language::Gu];

    /// Two-letter language code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Ta => "ta",
            Self::Gu => "gu",
        }
    }

    /// English name of the language, used inside model prompts.
    #[must_use]
    pub fn english_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hindi",
            Self::Ta => "Tamil",
            Self::Gu => "Gujarati",
        }
    }

    /// Label shown in the language picker.
    #[must_use]
    pub fn native_label(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "हिन्दी",
            Self::Ta => "தமிழ்",
            Self::Gu => "ગુજરાતી",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language code: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "hi" => Ok(Self::Hi),
            "ta" => Ok(Self::Ta),
            "gu" => Ok(Self::Gu),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

// =============================================================================
// STRING BUNDLES
// =============================================================================

#[derive(Debug)]
pub struct VerdictLabels {
    pub real: &'static str,
    pub fake: &'static str,
    pub suspicious: &'static str,
}

#[derive(Debug)]
pub struct RiskLabels {
    pub safe: &'static str,
    pub suspicious: &'static str,
    pub scam: &'static str,
}

#[derive(Debug)]
pub struct TabLabels {
    pub home: &'static str,
    pub sahayak: &'static str,
    pub guard: &'static str,
    pub community: &'static str,
    pub profile: &'static str,
}

/// Tags shown next to the verdict badge describing what was checked.
#[derive(Debug)]
pub struct MediaLabels {
    pub text: &'static str,
    pub image: &'static str,
    pub video: &'static str,
    pub voice: &'static str,
}

/// Headings used inside the chat scan report.
#[derive(Debug)]
pub struct ReportLabels {
    pub title: &'static str,
    pub verdict: &'static str,
    pub risk_level: &'static str,
    pub summary: &'static str,
    pub sources: &'static str,
    pub follow_up: &'static str,
}

#[derive(Debug)]
pub struct UiStrings {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub analyzing: &'static str,
    pub verdicts: VerdictLabels,
    pub risk: RiskLabels,
    pub tabs: TabLabels,
    pub media: MediaLabels,
    pub report: ReportLabels,
    pub verified_sources: &'static str,
    pub listen: &'static str,
    pub stop_listening: &'static str,
    pub share_alert: &'static str,
    pub share_call_to_action: &'static str,
    pub greeting: &'static str,
    pub scanning: &'static str,
    pub scan_failed: &'static str,
    pub service_busy: &'static str,
    pub verification_failed: &'static str,
    pub mic_denied: &'static str,
    pub scan_denied: &'static str,
    pub scan_unsupported: &'static str,
    pub playback_unavailable: &'static str,
    pub emergency: &'static str,
}

impl UiStrings {
    #[must_use]
    pub fn verdict_label(&self, verdict: Verdict) -> &'static str {
        match verdict {
            Verdict::Real => self.verdicts.real,
            Verdict::Fake => self.verdicts.fake,
            Verdict::Suspicious => self.verdicts.suspicious,
        }
    }
}

/// Return the string bundle for `language`.
#[must_use]
pub fn strings(language: Language) -> &'static UiStrings {
    match language {
        Language::En => &EN,
        Language::Hi => &HI,
        Language::Ta => &TA,
        Language::Gu => &GU,
    }
}

static EN: UiStrings = UiStrings {
    title: "Satyam",
    subtitle: "Bharat Digital Safety Suite",
    analyzing: "Verifying with Official Records...",
    verdicts: VerdictLabels { real: "Verified Real", fake: "Confirmed Fake", suspicious: "Warning: Suspicious" },
    risk: RiskLabels { safe: "Safe Content", suspicious: "Suspicious / Risky", scam: "Scam Detected" },
    tabs: TabLabels { home: "Home", sahayak: "Sahayak", guard: "Guard", community: "Village", profile: "Profile" },
    media: MediaLabels { text: "Text Message", image: "Image", video: "Video", voice: "Voice Note" },
    report: ReportLabels {
        title: "Screen Scan Report",
        verdict: "Verdict",
        risk_level: "Risk Level",
        summary: "Summary",
        sources: "Sources",
        follow_up: "Ask me anything about this result.",
    },
    verified_sources: "Verified Documents",
    listen: "Listen to Proof",
    stop_listening: "Stop Listening",
    share_alert: "Alert your Friends",
    share_call_to_action: "Check truth on Satyam App.",
    greeting: "Namaste! I am Satyam Sahayak. After scanning your screen, you can ask me follow-up questions about what we found.",
    scanning: "🔍 Scanning your screen for digital risks...",
    scan_failed: "Scan failed due to technical error. Please try again.",
    service_busy: "Sahayak Service is temporarily busy. Please try again in a moment.",
    verification_failed: "Verification failed. Please check connection.",
    mic_denied: "Mic access denied.",
    scan_denied: "Screen access denied.",
    scan_unsupported: "Screen scan not supported here.",
    playback_unavailable: "Audio playback is unavailable right now.",
    emergency: "Emergency 112",
};

static HI: UiStrings = UiStrings {
    title: "सत्यम",
    subtitle: "भारत डिजिटल सुरक्षा सुइट",
    analyzing: "सरकारी रिकॉर्ड से जांच जारी है...",
    verdicts: VerdictLabels { real: "सत्यापित असली", fake: "पुष्टि की गई फर्जी", suspicious: "चेतावनी: संदिग्ध" },
    risk: RiskLabels { safe: "सुरक्षित", suspicious: "संदिग्ध गतिविधि", scam: "फ्रॉड का खतरा" },
    tabs: TabLabels { home: "मुख्य", sahayak: "सहायक", guard: "गार्ड", community: "चौपाल", profile: "प्रोफ़ाइल" },
    media: MediaLabels { text: "टेक्स्ट संदेश", image: "फ़ोटो", video: "वीडियो", voice: "आवाज़ संदेश" },
    report: ReportLabels {
        title: "स्क्रीन स्कैन रिपोर्ट",
        verdict: "नतीजा",
        risk_level: "जोखिम स्तर",
        summary: "सारांश",
        sources: "स्रोत",
        follow_up: "इस नतीजे के बारे में मुझसे कुछ भी पूछें।",
    },
    verified_sources: "सत्यापित दस्तावेज़",
    listen: "सबूत सुनें",
    stop_listening: "सुनना बंद करें",
    share_alert: "दोस्तों को सावधान करें",
    share_call_to_action: "सत्यम ऐप पर सच्चाई जांचें।",
    greeting: "नमस्ते! मैं सत्यम सहायक हूँ। आपकी स्क्रीन को स्कैन करने के बाद, आप मुझसे कोई भी सवाल पूछ सकते हैं।",
    scanning: "🔍 आपकी स्क्रीन की जांच की जा रही है...",
    scan_failed: "तकनीकी खराबी के कारण स्कैन विफल रहा। कृपया फिर से प्रयास करें।",
    service_busy: "सहायक सेवा अभी व्यस्त है। कृपया थोड़ी देर में फिर प्रयास करें।",
    verification_failed: "जांच विफल रही। कृपया कनेक्शन जांचें।",
    mic_denied: "माइक की अनुमति नहीं मिली।",
    scan_denied: "स्क्रीन की अनुमति नहीं मिली।",
    scan_unsupported: "यहाँ स्क्रीन स्कैन उपलब्ध नहीं है।",
    playback_unavailable: "ऑडियो अभी उपलब्ध नहीं है।",
    emergency: "आपातकालीन 112",
};

static TA: UiStrings = UiStrings {
    title: "சத்யம்",
    subtitle: "பாரத டிஜிட்டல் பாதுகாப்பு தொகுப்பு",
    analyzing: "சரிபார்க்கிறது...",
    verdicts: VerdictLabels { real: "உண்மையானது", fake: "போலியானது", suspicious: "எச்சரிக்கை: சந்தேகம்" },
    risk: RiskLabels { safe: "பாதுகாப்பானது", suspicious: "சந்தேகத்திற்கிடமானது", scam: "மோசடி கண்டறியப்பட்டது" },
    tabs: TabLabels { home: "முகப்பு", sahayak: "சகாயக்", guard: "பாதுகாப்பு", community: "கிராமம்", profile: "சுயவிவரம்" },
    media: MediaLabels { text: "உரைச் செய்தி", image: "படம்", video: "வீடியோ", voice: "குரல் செய்தி" },
    report: ReportLabels {
        title: "திரை ஸ்கேன் அறிக்கை",
        verdict: "முடிவு",
        risk_level: "ஆபத்து நிலை",
        summary: "சுருக்கம்",
        sources: "ஆதாரங்கள்",
        follow_up: "இந்த முடிவைப் பற்றி என்னிடம் எதையும் கேளுங்கள்.",
    },
    verified_sources: "சரிபார்க்கப்பட்ட ஆவணங்கள்",
    listen: "ஆதாரத்தைக் கேளுங்கள்",
    stop_listening: "கேட்பதை நிறுத்து",
    share_alert: "நண்பர்களை எச்சரிக்கவும்",
    share_call_to_action: "சத்யம் செயலியில் உண்மையைச் சரிபார்க்கவும்.",
    greeting: "வணக்கம்! நான் சத்யம் சகாயக். உங்கள் திரையை ஸ்கேன் செய்த பிறகு, நீங்கள் என்னிடம் ஏதேனும் கேள்விகளைக் கேட்கலாம்.",
    scanning: "🔍 உங்கள் திரை சரிபார்க்கப்படுகிறது...",
    scan_failed: "தொழில்நுட்பக் கோளாறால் ஸ்கேன் தோல்வியடைந்தது. மீண்டும் முயற்சிக்கவும்.",
    service_busy: "சகாயக் சேவை தற்போது பரபரப்பாக உள்ளது. சிறிது நேரம் கழித்து முயற்சிக்கவும்.",
    verification_failed: "சரிபார்ப்பு தோல்வியடைந்தது. இணைப்பைச் சரிபார்க்கவும்.",
    mic_denied: "மைக் அனுமதி மறுக்கப்பட்டது.",
    scan_denied: "திரை அனுமதி மறுக்கப்பட்டது.",
    scan_unsupported: "இங்கே திரை ஸ்கேன் ஆதரிக்கப்படவில்லை.",
    playback_unavailable: "ஒலி இயக்கம் தற்போது கிடைக்கவில்லை.",
    emergency: "அவசரம் 112",
};

static GU: UiStrings = UiStrings {
    title: "સત્યમ",
    subtitle: "ભારત ડિજિટલ સેફ્ટી સુઈટ",
    analyzing: "AI સાથે ચકાસણી થઈ રહી છે...",
    verdicts: VerdictLabels { real: "ચકાસાયેલ અસલી", fake: "પુષ્ટિ થયેલ નકલી", suspicious: "ચેતવણી: શંકાસ્પદ" },
    risk: RiskLabels { safe: "સલામત સામગ્રી", suspicious: "શંકાસ્પદ / જોખમી", scam: "સ્કેમ જણાયું" },
    tabs: TabLabels { home: "મુખ્ય", sahayak: "સહાયક", guard: "ગાર્ડ", community: "ચોપાલ", profile: "પ્રોફાઇલ" },
    media: MediaLabels { text: "ટેક્સ્ટ સંદેશ", image: "છબી", video: "વિડિઓ", voice: "વોઈસ સંદેશ" },
    report: ReportLabels {
        title: "સ્ક્રીન સ્કેન રિપોર્ટ",
        verdict: "પરિણામ",
        risk_level: "જોખમ સ્તર",
        summary: "સારાંશ",
        sources: "સ્ત્રોતો",
        follow_up: "આ પરિણામ વિશે મને કંઈપણ પૂછો.",
    },
    verified_sources: "ચકાસાયેલ દસ્તાવેજો",
    listen: "પુરાવો સાંભળો",
    stop_listening: "સાંભળવાનું બંધ કરો",
    share_alert: "મિત્રોને સાવધ કરો",
    share_call_to_action: "સત્યમ એપ પર સત્ય તપાસો.",
    greeting: "નમસ્તે! હું સત્યમ સહાયક છું. તમારી સ્ક્રીન સ્કેન કર્યા પછી, તમે મને કોઈપણ પ્રશ્નો પૂછી શકો છો.",
    scanning: "🔍 તમારી સ્ક્રીન તપાસવામાં આવી રહી છે...",
    scan_failed: "તકનીકી ખામીને કારણે સ્કેન નિષ્ફળ ગયું. કૃપા કરીને ફરી પ્રયાસ કરો.",
    service_busy: "સહાયક સેવા હાલમાં વ્યસ્ત છે. કૃપા કરીને થોડી વારમાં ફરી પ્રયાસ કરો.",
    verification_failed: "ચકાસણી નિષ્ફળ ગઈ. કૃપા કરીને કનેક્શન તપાસો.",
    mic_denied: "માઇકની પરવાનગી નકારી.",
    scan_denied: "સ્ક્રીનની પરવાનગી નકારી.",
    scan_unsupported: "અહીં સ્ક્રીન સ્કેન ઉપલબ્ધ નથી.",
    playback_unavailable: "ઓડિયો હાલમાં ઉપલબ્ધ નથી.",
    emergency: "ઇમરજન્સી 112",
};

#[cfg(test)]
#[path = "i18n_test.rs"]
mod tests;
