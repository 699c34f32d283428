use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raised when a string does not name a member of one of the fixed sets below.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! catalog {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

catalog! {
    /// Cuisine a restaurant is listed under.
    Category, "category" {
        Asian => "Asian",
        Chinese => "Chinese",
        Japanese => "Japanese",
        Western => "Western",
    }
}

catalog! {
    /// Delhi NCR area a restaurant is listed in.
    Location, "location" {
        ConnaughtPlace => "Connaught Place (CP)",
        HauzKhasVillage => "Hauz Khas Village",
        Saket => "Saket",
        VasantKunj => "Vasant Kunj",
        NehruPlace => "Nehru Place",
        LajpatNagar => "Lajpat Nagar",
        GreaterKailash => "Greater Kailash (GK)",
        KhanMarket => "Khan Market",
        RajouriGarden => "Rajouri Garden",
        PunjabiBagh => "Punjabi Bagh",
        Dwarka => "Dwarka",
        Rohini => "Rohini",
        Pitampura => "Pitampura",
        KamlaNagar => "Kamla Nagar",
        CyberHub => "Cyber Hub (Gurgaon)",
        Sector29 => "Sector 29 (Gurgaon)",
        GolfCourseRoad => "Golf Course Road (Gurgaon)",
        MgRoad => "MG Road (Gurgaon)",
        UdyogVihar => "Udyog Vihar (Gurgaon)",
        SohnaRoad => "Sohna Road (Gurgaon)",
        Sector18Noida => "Sector 18 (Noida)",
        Sector62Noida => "Sector 62 (Noida)",
        GreaterNoida => "Greater Noida",
        Ghaziabad => "Ghaziabad",
        Faridabad => "Faridabad",
    }
}

catalog! {
    /// Day of the week. Ordered Sunday first, matching the closed-days picker.
    Weekday, "weekday" {
        Sunday => "Sunday",
        Monday => "Monday",
        Tuesday => "Tuesday",
        Wednesday => "Wednesday",
        Thursday => "Thursday",
        Friday => "Friday",
        Saturday => "Saturday",
    }
}
