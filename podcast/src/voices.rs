//! Static catalogue of the voices offered by the speech service.
//!
//! The registry is read-only data shared by every request. Its order is
//! significant: voice assignment walks it front to back.

use serde::Serialize;
use std::fmt;

/// Voice used when nothing better can be assigned
pub const DEFAULT_VOICE_ID: &str = "lisa";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Female => f.write_str("female"),
            Gender::Male => f.write_str("male"),
        }
    }
}

/// A named synthetic speaking identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Voice {
    pub id: &'static str,
    pub label: &'static str,
    pub gender: Gender,
}

const fn voice(id: &'static str, label: &'static str, gender: Gender) -> Voice {
    Voice { id, label, gender }
}

static VOICES: [Voice; 113] = [
    voice("monica", "Monica", Gender::Female),
    voice("bwyneth", "Bwyneth", Gender::Female),
    voice("carly", "Carly", Gender::Female),
    voice("kristy", "Kristy", Gender::Female),
    voice("tasha", "Tasha", Gender::Female),
    voice("lisa", "Lisa", Gender::Female),
    voice("emily", "Emily", Gender::Female),
    voice("julie", "Julie", Gender::Female),
    voice("erin", "Erin", Gender::Female),
    voice("lindsey", "Lindsey", Gender::Female),
    voice("stacy", "Stacy", Gender::Female),
    voice("evelyn", "Evelyn", Gender::Female),
    voice("victoria", "Victoria", Gender::Female),
    voice("george", "George", Gender::Male),
    voice("oliver", "Oliver", Gender::Male),
    voice("joe", "Joe", Gender::Male),
    voice("mark", "Mark", Gender::Male),
    voice("nick", "Nick", Gender::Male),
    voice("jack", "Jack", Gender::Male),
    voice("jesse", "Jesse", Gender::Male),
    voice("keenan", "Keenan", Gender::Male),
    voice("jacob", "Jacob", Gender::Male),
    voice("james", "James", Gender::Male),
    voice("mason", "Mason", Gender::Male),
    voice("matthew", "Matthew", Gender::Male),
    voice("brian", "Brian", Gender::Male),
    voice("anthony", "Anthony", Gender::Male),
    voice("donald", "Donald", Gender::Male),
    voice("paul", "Paul", Gender::Male),
    voice("steven", "Steven", Gender::Male),
    voice("andrew", "Andrew", Gender::Male),
    voice("kenneth", "Kenneth", Gender::Male),
    voice("joshua", "Joshua", Gender::Male),
    voice("samuel", "Samuel", Gender::Male),
    voice("gregory", "Gregory", Gender::Male),
    voice("frank", "Frank", Gender::Male),
    voice("alexander", "Alexander", Gender::Male),
    voice("raymond", "Raymond", Gender::Male),
    voice("patrick", "Patrick", Gender::Male),
    voice("bruce", "Bruce", Gender::Male),
    voice("bobby", "Bobby", Gender::Male),
    voice("johnny", "Johnny", Gender::Male),
    voice("bradley", "Bradley", Gender::Male),
    voice("dale", "Dale", Gender::Male),
    voice("howard", "Howard", Gender::Male),
    voice("fred", "Fred", Gender::Male),
    voice("blake", "Blake", Gender::Male),
    voice("dennis", "Dennis", Gender::Male),
    voice("jerry", "Jerry", Gender::Male),
    voice("tyler", "Tyler", Gender::Male),
    voice("aaron", "Aaron", Gender::Male),
    voice("larry", "Larry", Gender::Male),
    voice("keith", "Keith", Gender::Male),
    voice("scott", "Scott", Gender::Male),
    voice("curtis", "Curtis", Gender::Male),
    voice("todd", "Todd", Gender::Male),
    voice("leonard", "Leonard", Gender::Male),
    voice("calvin", "Calvin", Gender::Male),
    voice("edwin", "Edwin", Gender::Male),
    voice("don", "Don", Gender::Male),
    voice("craig", "Craig", Gender::Male),
    voice("danny", "Danny", Gender::Male),
    voice("stanley", "Stanley", Gender::Male),
    voice("jeffery", "Jeffery", Gender::Male),
    voice("herbert", "Herbert", Gender::Male),
    voice("lee", "Lee", Gender::Male),
    voice("trevor", "Trevor", Gender::Male),
    voice("brendan", "Brendan", Gender::Male),
    voice("toby", "Toby", Gender::Male),
    voice("van", "Van", Gender::Male),
    voice("myron", "Myron", Gender::Male),
    voice("boyd", "Boyd", Gender::Male),
    voice("joel", "Joel", Gender::Male),
    voice("earl", "Earl", Gender::Male),
    voice("brett", "Brett", Gender::Male),
    voice("steve", "Steve", Gender::Male),
    voice("jon", "Jon", Gender::Male),
    voice("bob", "Bob", Gender::Male),
    voice("jim", "Jim", Gender::Male),
    voice("matt", "Matt", Gender::Male),
    voice("lyle", "Lyle", Gender::Male),
    voice("hubert", "Hubert", Gender::Male),
    voice("kenny", "Kenny", Gender::Male),
    voice("doug", "Doug", Gender::Male),
    voice("sammy", "Sammy", Gender::Male),
    voice("homer", "Homer", Gender::Male),
    voice("wendell", "Wendell", Gender::Male),
    voice("woodrow", "Woodrow", Gender::Male),
    voice("felipe", "Felipe", Gender::Male),
    voice("garry", "Garry", Gender::Male),
    voice("pete", "Pete", Gender::Male),
    voice("marco", "Marco", Gender::Male),
    voice("rufus", "Rufus", Gender::Male),
    voice("owen", "Owen", Gender::Male),
    voice("bryant", "Bryant", Gender::Male),
    voice("abraham", "Abraham", Gender::Male),
    voice("irving", "Irving", Gender::Male),
    voice("jermaine", "Jermaine", Gender::Male),
    voice("julius", "Julius", Gender::Male),
    voice("marty", "Marty", Gender::Male),
    voice("russell", "Russell", Gender::Male),
    voice("benjamin", "Benjamin", Gender::Male),
    voice("michael", "Michael", Gender::Male),
    voice("collin", "Collin", Gender::Male),
    voice("phil", "Phil", Gender::Male),
    voice("archie", "Archie", Gender::Male),
    voice("freddie", "Freddie", Gender::Male),
    voice("harper", "Harper", Gender::Male),
    voice("austin", "Austin", Gender::Male),
    voice("derek", "Derek", Gender::Male),
    voice("ellis", "Ellis", Gender::Male),
    voice("ian", "Ian", Gender::Male),
    voice("oscar", "Oscar", Gender::Male),
];

/// Read-only view over an ordered voice catalogue
#[derive(Debug, Clone, Copy)]
pub struct VoiceRegistry {
    voices: &'static [Voice],
}

impl VoiceRegistry {
    /// The catalogue shipped with the program
    pub fn builtin() -> Self {
        Self { voices: &VOICES }
    }

    /// A registry over a custom catalogue (tests, alternative providers)
    pub fn from_static(voices: &'static [Voice]) -> Self {
        Self { voices }
    }

    pub fn voices(&self) -> &'static [Voice] {
        self.voices
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&'static Voice> {
        let voices = self.voices;
        voices.iter().find(|v| v.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn by_gender(&self, gender: Gender) -> impl Iterator<Item = &'static Voice> + use<> {
        let voices = self.voices;
        voices.iter().filter(move |v| v.gender == gender)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + use<> {
        let voices = self.voices;
        voices.iter().map(|v| v.id)
    }
}

impl Default for VoiceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
