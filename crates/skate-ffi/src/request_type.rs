//! Command-type codes understood by the engine.

macro_rules! request_types {
    ($($(#[$meta:meta])* $name:ident = $value:literal,)+) => {
        /// Identifies which server command a [`crate::CmdInfo`] carries.
        ///
        /// Discriminants are ABI-stable: they are assigned in blocks per
        /// command family and are never reused. The catalog here is the
        /// surface the binding exposes; anything else goes through
        /// [`RequestType::CustomCommand`] with the command name as the
        /// first argument.
        #[repr(i32)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum RequestType {
            $($(#[$meta])* $name = $value,)+
        }

        impl RequestType {
            pub fn from_raw(raw: i32) -> Option<Self> {
                match raw {
                    $($value => Some(Self::$name),)+
                    _ => None,
                }
            }
        }
    };
}

request_types! {
    InvalidRequest = 0,
    /// Escape hatch: args carry the command name followed by its arguments.
    CustomCommand = 1,

    // Strings.
    Get = 101,
    Set = 102,
    GetDel = 103,
    GetRange = 104,
    Append = 105,
    Strlen = 106,
    Incr = 107,
    IncrBy = 108,
    IncrByFloat = 109,
    Decr = 110,
    DecrBy = 111,
    MGet = 112,
    MSet = 113,
    MSetNx = 114,
    SetRange = 115,

    // Generic key management.
    Del = 201,
    Exists = 202,
    Expire = 203,
    ExpireAt = 204,
    Ttl = 205,
    PTtl = 206,
    Persist = 207,
    Type = 208,
    Unlink = 209,
    Rename = 210,
    RenameNx = 211,
    Touch = 212,

    // Hashes.
    HGet = 301,
    HSet = 302,
    HDel = 303,
    HGetAll = 304,
    HMGet = 305,
    HExists = 306,
    HLen = 307,
    HKeys = 308,
    HVals = 309,
    HIncrBy = 310,
    HSetNx = 311,

    // Lists.
    LPush = 401,
    RPush = 402,
    LPop = 403,
    RPop = 404,
    LRange = 405,
    LLen = 406,
    LIndex = 407,
    LSet = 408,
    LTrim = 409,
    LRem = 410,

    // Sets.
    SAdd = 501,
    SRem = 502,
    SMembers = 503,
    SCard = 504,
    SIsMember = 505,
    SPop = 506,
    SMove = 507,

    // Sorted sets.
    ZAdd = 601,
    ZRem = 602,
    ZRange = 603,
    ZCard = 604,
    ZScore = 605,
    ZIncrBy = 606,
    ZRank = 607,
    ZCount = 608,
    ZPopMin = 609,
    ZPopMax = 610,

    // Streams.
    XAdd = 701,
    XRead = 702,
    XLen = 703,
    XRange = 704,
    XRevRange = 705,
    XDel = 706,
    XTrim = 707,

    // Server administration.
    Ping = 801,
    Echo = 802,
    Info = 803,
    Select = 804,
    ConfigGet = 805,
    ConfigSet = 806,
    DbSize = 807,
    FlushAll = 808,
    FlushDb = 809,
    Time = 810,

    // Cluster administration.
    ClusterInfo = 901,
    ClusterNodes = 902,
    ClusterSlots = 903,
    ClusterShards = 904,
    ClusterKeySlot = 905,
    ClusterCountKeysInSlot = 906,
    ClusterGetKeysInSlot = 907,
    ClusterMyId = 908,

    // Pub/sub.
    Publish = 1001,
    SPublish = 1002,
    PubSubChannels = 1003,
    PubSubNumSub = 1004,
    PubSubNumPat = 1005,

    // Scripting (load/invoke go through dedicated engine calls).
    ScriptExists = 1101,
    ScriptFlush = 1102,
}

#[cfg(test)]
mod tests {
    use super::RequestType;

    #[test]
    fn raw_codes_round_trip() {
        assert_eq!(RequestType::from_raw(1), Some(RequestType::CustomCommand));
        assert_eq!(RequestType::from_raw(102), Some(RequestType::Set));
        assert_eq!(RequestType::from_raw(601), Some(RequestType::ZAdd));
        assert_eq!(RequestType::from_raw(908), Some(RequestType::ClusterMyId));
        assert_eq!(RequestType::from_raw(7777), None);
    }
}
